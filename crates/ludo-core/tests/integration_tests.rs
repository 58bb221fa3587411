//! Integration tests for the Ludo Rush game engine.
//!
//! These tests verify complete game flows from the first roll through to victory.

use ludo_core::rules;
use ludo_core::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// Turns after which a bot-only game is considered stuck
const MAX_TURNS: u32 = 5_000;

fn assert_positions_valid(game: &GameState) {
    for player in &game.players {
        for token in &player.tokens {
            assert!(
                game.board.is_valid(token.position),
                "{} left the board at {}",
                token.label(),
                token.position
            );
            if token.is_shielded {
                assert!(token.shield_turns > 0);
            }
        }
    }
}

/// Play a game where every seat is a bot, checking invariants after each turn
fn play_bot_game(player_count: u8, difficulty: BotDifficulty, seed: u64) -> GameState {
    let config = GameConfig::all_ai(player_count, difficulty).with_seed(seed);
    let mut game = GameState::new(config).expect("valid config");
    let mut bots: Vec<Bot> = (0..player_count)
        .map(|id| Bot::with_seed(id, difficulty, seed.wrapping_add(id as u64)))
        .collect();

    while !game.is_finished() && game.turn_count < MAX_TURNS {
        let current = game.current_player as usize;
        let events = bots[current]
            .take_turn(&mut game)
            .expect("bots only pick valid actions");
        assert!(!events.is_empty(), "bot {} made no progress", current);
        assert_positions_valid(&game);
    }

    game
}

#[test]
fn test_full_two_player_game() {
    let game = play_bot_game(2, BotDifficulty::Medium, 42);

    assert!(game.is_finished(), "game should finish in {} turns", MAX_TURNS);
    let winner = game.get_winner().expect("finished game has a winner");
    assert!(winner
        .tokens
        .iter()
        .all(|t| game.board.is_finished(t.position)));
    assert_eq!(rules::check_winner(&game), Some(winner.id));
}

#[test]
fn test_full_games_at_every_difficulty() {
    for (i, difficulty) in [BotDifficulty::Easy, BotDifficulty::Medium, BotDifficulty::Hard]
        .into_iter()
        .enumerate()
    {
        for players in 2..=4u8 {
            let game = play_bot_game(players, difficulty, 100 + i as u64 * 10 + players as u64);
            assert!(
                game.is_finished(),
                "{:?} game with {} players did not finish",
                difficulty,
                players
            );
        }
    }
}

#[test]
fn test_summary_after_bot_game() {
    let game = play_bot_game(4, BotDifficulty::Hard, 7);
    let summary = game.summary().expect("game is over");

    assert_eq!(summary.players.len(), 4);
    assert_eq!(summary.players[0].id, summary.winner);
    assert_eq!(summary.players[0].tokens_finished, 4);
    assert_eq!(summary.turn_count, game.turn_count);

    let placements: Vec<u8> = summary.players.iter().map(|p| p.placement).collect();
    assert_eq!(placements, vec![1, 2, 3, 4]);

    for line in &summary.players {
        let player = game.get_player(line.id).unwrap();
        assert_eq!(line.captures, player.captures);
        assert!(line.longest_streak <= line.captures);
    }
}

#[test]
fn test_seeded_games_replay_identically() {
    let a = play_bot_game(3, BotDifficulty::Medium, 2024);
    let b = play_bot_game(3, BotDifficulty::Medium, 2024);

    assert_eq!(a.winner, b.winner);
    assert_eq!(a.turn_count, b.turn_count);
    assert_eq!(
        serde_json::to_value(&a.players).unwrap(),
        serde_json::to_value(&b.players).unwrap()
    );
}

#[test]
fn test_red_leaves_home_on_six_only() {
    let mut game = GameState::new(GameConfig::new(2, 0, BotDifficulty::Easy).with_seed(1)).unwrap();

    game.apply_roll(0, 3).unwrap();
    assert_eq!(game.players[0].tokens[0].position, HOME);
    assert_eq!(game.current_player, 1);

    game.apply_roll(1, 2).unwrap();
    game.apply_roll(0, 6).unwrap();
    game.apply_action(0, GameAction::SelectToken(0)).unwrap();
    let events = game.apply_action(0, GameAction::ConfirmMove).unwrap();

    assert!(events.contains(&GameEvent::TokenMoved {
        player: 0,
        token: 0,
        from: HOME,
        to: game.board.entry(PlayerColor::Red),
    }));
}

#[test]
fn test_capture_on_index_ten() {
    let mut game = GameState::new(GameConfig::new(2, 0, BotDifficulty::Easy).with_seed(1)).unwrap();
    game.players[0].tokens[0].position = 7;
    game.players[1].tokens[0].position = 10;

    game.apply_roll(0, 3).unwrap();
    game.apply_action(0, GameAction::SelectToken(0)).unwrap();
    let events = game.apply_action(0, GameAction::ConfirmMove).unwrap();

    assert!(events.contains(&GameEvent::TokenCaptured {
        capturer: 0,
        captured: TokenRef::new(1, 0),
        streak: 1,
    }));
    assert_eq!(game.players[1].tokens[0].position, HOME);
    assert_eq!(game.players[0].capture_streak, 1);
    // 10 is also a mystery tile, so the capture comes with a power-up
    assert_eq!(game.players[0].coins, 10);
    assert_eq!(game.players[0].power_ups.len(), 1);
}

#[test]
fn test_lap_end_lands_in_finish_lane() {
    let mut game = GameState::new(GameConfig::new(2, 0, BotDifficulty::Easy).with_seed(1)).unwrap();
    let n = game.board.track_length();
    // N-2 cells into red's lap
    game.players[0].tokens[0].position = n - 2;

    game.apply_roll(0, 4).unwrap();
    game.apply_action(0, GameAction::SelectToken(0)).unwrap();
    game.apply_action(0, GameAction::ConfirmMove).unwrap();

    let position = game.players[0].tokens[0].position;
    assert!(game.board.is_finish_lane(position));
    assert_eq!(position, game.board.finish_lane_start() + 2);
}

#[test]
fn test_boost_follow_up_moves_again() {
    let mut game = GameState::new(GameConfig::new(2, 0, BotDifficulty::Easy).with_seed(1)).unwrap();
    game.players[0].tokens[0].position = 1;

    game.apply_roll(0, 3).unwrap();
    game.apply_action(0, GameAction::SelectToken(0)).unwrap();
    let events = game.apply_action(0, GameAction::ConfirmMove).unwrap();

    assert!(events.contains(&GameEvent::BoostEarned {
        player: 0,
        token: 0,
        bonus: 6
    }));
    // The boost at 4 carries the token on to 10
    assert_eq!(game.players[0].tokens[0].position, 10);
    assert!(events.contains(&GameEvent::TokenMoved {
        player: 0,
        token: 0,
        from: 4,
        to: 10
    }));
}

#[test]
fn test_hard_bot_finishes_token() {
    let mut game = GameState::new(GameConfig::all_ai(2, BotDifficulty::Hard).with_seed(3)).unwrap();
    let terminal = game.board.terminal();
    game.players[0].tokens[0].position = 30;
    game.players[0].tokens[1].position = terminal - 5;

    game.apply_roll(0, 5).unwrap();
    let mut bot = Bot::with_seed(0, BotDifficulty::Hard, 3);
    assert_eq!(bot.choose_action(&game), Some(GameAction::SelectToken(1)));
}

#[test]
fn test_freeze_skips_opponent() {
    let mut game = GameState::new(GameConfig::new(3, 0, BotDifficulty::Easy).with_seed(1)).unwrap();
    game.players[0].grant_power_up(PowerUpKind::Freeze);

    game.apply_action(
        0,
        GameAction::UsePowerUp {
            kind: PowerUpKind::Freeze,
            target: Some(PowerUpTarget::Player(1)),
        },
    )
    .unwrap();
    assert_eq!(game.frozen_turns(1), 1);

    let events = game.apply_roll(0, 2).unwrap();
    assert!(events.contains(&GameEvent::TurnSkipped {
        player: 1,
        reason: SkipReason::Frozen
    }));
    assert_eq!(game.current_player, 2);
    assert!(game.frozen_players.is_empty());
}

#[test]
fn test_rejected_action_leaves_state_untouched() {
    let mut game = GameState::new(GameConfig::new(2, 0, BotDifficulty::Easy).with_seed(1)).unwrap();
    game.players[0].grant_power_up(PowerUpKind::Sniper);
    let before = serde_json::to_value(&game).unwrap();

    let result = game.apply_action(
        0,
        GameAction::UsePowerUp {
            kind: PowerUpKind::Sniper,
            target: Some(PowerUpTarget::Token(TokenRef::new(1, 0))),
        },
    );
    assert_eq!(result, Err(GameError::InvalidTarget));
    assert_eq!(game.apply_action(0, GameAction::ConfirmMove), Err(GameError::InvalidPhase));
    assert_eq!(serde_json::to_value(&game).unwrap(), before);
}

fn any_position(n: i32) -> impl Strategy<Value = Position> {
    // Weight the terminal cell so some players are fully finished
    prop_oneof![
        1 => Just(HOME),
        2 => 0..n,
        1 => n..n + 6,
        3 => Just(n + 6),
    ]
}

proptest! {
    #[test]
    fn prop_dice_moves_stay_on_board(
        seed in any::<u64>(),
        players in 2..=4u8,
        faces in prop::collection::vec(1..=6u8, 1..400),
    ) {
        let mut game = GameState::new(GameConfig::new(players, 0, BotDifficulty::Easy).with_seed(seed)).unwrap();

        for (i, face) in faces.into_iter().enumerate() {
            if game.is_finished() {
                break;
            }
            let player = game.current_player;
            let mut events = game.apply_roll(player, face).unwrap();

            if game.phase == GamePhase::SelectingToken {
                let token = game.valid_moves[i % game.valid_moves.len()];
                game.apply_action(player, GameAction::SelectToken(token)).unwrap();
                events.extend(game.apply_action(player, GameAction::ConfirmMove).unwrap());
            }

            for event in &events {
                match event {
                    GameEvent::TokenMoved { player, from, to, .. } => {
                        let color = game.players[*player as usize].color;
                        if *from == HOME {
                            prop_assert_eq!(*to, game.board.entry(color));
                            prop_assert_eq!(face, 6);
                        } else {
                            prop_assert!(game.board.progress(color, *to) > game.board.progress(color, *from));
                        }
                    }
                    GameEvent::TokenCaptured { captured, .. } => {
                        let token = &game.players[captured.player as usize].tokens[captured.token as usize];
                        prop_assert_eq!(token.position, HOME);
                    }
                    _ => {}
                }
            }

            for p in &game.players {
                for t in &p.tokens {
                    prop_assert!(game.board.is_valid(t.position));
                }
            }
            prop_assert!(game.consecutive_sixes < 3);
        }
    }

    #[test]
    fn prop_winner_iff_all_tokens_finished(
        positions in prop::collection::vec(any_position(52), 8),
    ) {
        let mut game = GameState::new(GameConfig::new(2, 0, BotDifficulty::Easy).with_seed(0)).unwrap();
        for (i, position) in positions.iter().enumerate() {
            game.players[i / 4].tokens[i % 4].position = *position;
        }

        let terminal = game.board.terminal();
        let finished: Vec<bool> = game
            .players
            .iter()
            .map(|p| p.tokens.iter().all(|t| t.position == terminal))
            .collect();

        match rules::check_winner(&game) {
            Some(winner) => prop_assert!(finished[winner as usize]),
            None => prop_assert!(finished.iter().all(|f| !f)),
        }
    }

    #[test]
    fn prop_next_turn_terminates(
        players in 2..=4u8,
        frozen in prop::collection::vec(0..4u32, 4),
        current in 0..4u8,
    ) {
        let mut game = GameState::new(GameConfig::new(players, 0, BotDifficulty::Easy).with_seed(0)).unwrap();
        game.current_player = current % players;
        for (id, turns) in frozen.iter().take(players as usize).enumerate() {
            if *turns > 0 {
                game.frozen_players.insert(id as PlayerId, *turns);
            }
        }

        let advance = rules::next_turn(&mut game);
        prop_assert!(advance.skipped.len() <= players as usize);
        prop_assert!(advance.next < players);
        prop_assert_eq!(game.phase, GamePhase::AwaitingRoll);
        prop_assert!(game.dice.can_roll);
        prop_assert!(game.frozen_players.values().all(|t| *t > 0));
    }
}
