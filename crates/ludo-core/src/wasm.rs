//! WebAssembly bindings for the Ludo Rush engine.
//!
//! This module exposes the game engine to JavaScript through wasm-bindgen.
//! Everything crosses the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::actions::GameAction;
use crate::bot::{Bot, BotDifficulty};
use crate::config::GameConfig;
use crate::game::GameState;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    state: GameState,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new game from a JSON `GameConfig`; missing fields use defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmGame, JsValue> {
        let config: GameConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;

        let state = GameState::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmGame { state })
    }

    /// Get the current game state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.state).unwrap_or_else(|_| "{}".to_string())
    }

    #[wasm_bindgen(js_name = getCurrentPlayer)]
    pub fn get_current_player(&self) -> u8 {
        self.state.current_player
    }

    /// Get valid actions for the current player as JSON array
    #[wasm_bindgen(js_name = getValidActions)]
    pub fn get_valid_actions(&self) -> String {
        let actions = self.state.valid_actions(self.state.current_player);
        serde_json::to_string(&actions).unwrap_or_else(|_| "[]".to_string())
    }

    /// Apply an action from JSON, returns events JSON or error
    #[wasm_bindgen(js_name = applyAction)]
    pub fn apply_action(&mut self, player: u8, action_json: &str) -> Result<String, JsValue> {
        let action: GameAction = serde_json::from_str(action_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid action JSON: {}", e)))?;

        match self.state.apply_action(player, action) {
            Ok(events) => Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())),
            Err(e) => Err(JsValue::from_str(&format!("Action failed: {}", e))),
        }
    }

    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    #[wasm_bindgen(js_name = getWinner)]
    pub fn get_winner(&self) -> Option<u8> {
        self.state.winner
    }

    /// Final results as JSON, `null` while the game is running
    #[wasm_bindgen(js_name = getSummary)]
    pub fn get_summary(&self) -> String {
        match self.state.summary() {
            Some(summary) => serde_json::to_string(&summary).unwrap_or_else(|_| "null".to_string()),
            None => "null".to_string(),
        }
    }

    /// Get the board tiles as JSON (for rendering)
    #[wasm_bindgen(js_name = getTiles)]
    pub fn get_tiles(&self) -> String {
        serde_json::to_string(self.state.board.tiles()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Display color of a seat as `0xRRGGBB`
    #[wasm_bindgen(js_name = getPlayerColor)]
    pub fn get_player_color(&self, player: u8) -> Option<u32> {
        self.state.get_player(player).map(|p| p.color.hex_code())
    }

    /// Get a bot's next action for a player.
    /// difficulty: "easy", "medium" or "hard"
    #[wasm_bindgen(js_name = getBotAction)]
    pub fn get_bot_action(&self, player: u8, difficulty: &str) -> String {
        let difficulty = difficulty.parse().unwrap_or(BotDifficulty::Medium);

        let mut bot = Bot::new(player, difficulty);
        match bot.choose_action(&self.state) {
            Some(action) => serde_json::to_string(&action).unwrap_or_else(|_| "null".to_string()),
            None => "null".to_string(),
        }
    }

    /// Suggested thinking pause for a bot, in milliseconds
    #[wasm_bindgen(js_name = getBotDelay)]
    pub fn get_bot_delay(&self, difficulty: &str) -> u32 {
        let difficulty = difficulty.parse().unwrap_or(BotDifficulty::Medium);
        Bot::new(0, difficulty).think_delay().as_millis() as u32
    }
}
