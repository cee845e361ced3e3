//! Extract and decode the model's structured action block.
//!
//! Parsing is two-stage.  [`extract_block`] finds the first fenced region
//! opened by ```` ```yml ```` or ```` ```yaml ```` and closed by the next
//! ```` ``` ````; [`decode_block`] turns the captured text into an
//! [`Instruction`].  Replies are read leniently: numbers may arrive as
//! strings, missing parameters fall back to zero values, and an unrecognised
//! `function` yields [`Instruction::Unknown`] rather than an error.
//!
//! ```rust
//! use craftpilot_runtime::response_parser::parse;
//! use craftpilot_types::Instruction;
//!
//! let reply = "The player is walking.\n```yml\naction:\n  function: move\n  parameters:\n    direction: forward\n    distance: 0.2\n```";
//! assert_eq!(
//!     parse(reply).unwrap(),
//!     Instruction::Move { direction: "forward".into(), distance: 0.2, jumping: false },
//! );
//! ```

use std::sync::LazyLock;

use craftpilot_types::{CraftError, Instruction};
use regex::Regex;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:yml|yaml)([\s\S]*?)```").expect("fenced block pattern is valid")
});

/// Why a reply could not be turned into an instruction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("reply contains no ```yml / ```yaml block")]
    NoStructuredBlock,
    #[error("malformed action block: {0}")]
    MalformedBlock(String),
}

impl From<ParseError> for CraftError {
    fn from(e: ParseError) -> Self {
        CraftError::Parse(e.to_string())
    }
}

/// The trimmed text of the first fenced YAML block in `reply`.
pub fn extract_block(reply: &str) -> Result<&str, ParseError> {
    FENCED_BLOCK
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .ok_or(ParseError::NoStructuredBlock)
}

/// Decode an `action: {function, parameters}` document.
pub fn decode_block(block: &str) -> Result<Instruction, ParseError> {
    let doc: Value =
        serde_yaml::from_str(block).map_err(|e| ParseError::MalformedBlock(e.to_string()))?;
    let action = doc
        .get("action")
        .ok_or_else(|| ParseError::MalformedBlock("missing `action` key".into()))?;
    if !action.is_mapping() {
        return Err(ParseError::MalformedBlock("`action` is not a mapping".into()));
    }

    let function = action.get("function").map(scalar_text).unwrap_or_default();
    let empty = Mapping::new();
    let params = Params(match action.get("parameters") {
        Some(Value::Mapping(m)) => m,
        None | Some(Value::Null) => &empty,
        Some(_) => {
            return Err(ParseError::MalformedBlock("`parameters` is not a mapping".into()));
        }
    });

    Ok(match function.trim() {
        "move" => Instruction::Move {
            direction: params.text("direction"),
            distance: params.number("distance"),
            jumping: params.flag("jumping"),
        },
        "use_item" => Instruction::UseItem {
            item: params.text("item"),
        },
        "interact_block" => Instruction::InteractBlock {
            block: params.text("block"),
            interaction: params.text("interaction"),
        },
        "attack_entity" => Instruction::AttackEntity {
            entity_type: params.text("entity_type"),
            weapon: params.text("weapon"),
        },
        "craft_item" => Instruction::CraftItem {
            item: params.text("item"),
            count: params.count("count"),
            ingredients: params.list("ingredients"),
        },
        "pickup_item" => Instruction::PickupItem {
            item: params.text("item"),
            count: params.count("count"),
        },
        "destroy_item" => Instruction::DestroyItem {
            item: params.text("item"),
        },
        "player_sleep" => Instruction::PlayerSleep {
            bed_position: params.text("bed_position"),
        },
        "player_wake" => Instruction::PlayerWake {
            wake_immediately: params.flag("wake_immediately"),
        },
        "anvil_repair" => Instruction::AnvilRepair {
            result_item: params.text("result_item"),
            left_input: params.text("left_input"),
            right_input: params.text("right_input"),
        },
        "container_event" => Instruction::ContainerEvent {
            container: params.text("container"),
        },
        "start_drawing_bow" => Instruction::StartDrawingBow {
            bow: params.text("bow"),
        },
        "release_arrow" => Instruction::ReleaseArrow {
            bow: params.text("bow"),
            charge: params.count("charge"),
            power: params.number("power"),
        },
        "use_bonemeal" => Instruction::UseBonemeal {
            target_block: params.text("target_block"),
            position: params.text("position"),
        },
        _ => Instruction::Unknown { function },
    })
}

/// [`extract_block`] followed by [`decode_block`].
pub fn parse(reply: &str) -> Result<Instruction, ParseError> {
    decode_block(extract_block(reply)?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Lenient scalar coercion
// ─────────────────────────────────────────────────────────────────────────────

fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

struct Params<'a>(&'a Mapping);

impl Params<'_> {
    fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn text(&self, key: &str) -> String {
        self.get(key).map(scalar_text).unwrap_or_default()
    }

    /// Non-negative finite number; anything else reads as `0.0`.
    fn number(&self, key: &str) -> f64 {
        let raw = match self.get(key) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        raw.filter(|d| d.is_finite() && *d >= 0.0).unwrap_or(0.0)
    }

    fn count(&self, key: &str) -> u32 {
        match self.get(key) {
            Some(Value::Number(n)) => n
                .as_u64()
                .map(|c| c.min(u64::from(u32::MAX)) as u32)
                .unwrap_or_else(|| self.number(key) as u32),
            Some(Value::String(_)) => self.number(key) as u32,
            _ => 0,
        }
    }

    fn flag(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    fn list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Sequence(items)) => items.iter().map(scalar_text).collect(),
            Some(v @ Value::String(_)) => vec![scalar_text(v)],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn move_of(direction: &str, distance: f64) -> Instruction {
        Instruction::Move {
            direction: direction.into(),
            distance,
            jumping: false,
        }
    }

    #[test]
    fn extracts_yml_block_and_trims() {
        let reply = "reasoning...\n```yml\n  action:\n    function: move\n```\ntrailer";
        assert_eq!(extract_block(reply).unwrap(), "action:\n    function: move");
    }

    #[test]
    fn yaml_tag_is_accepted() {
        let reply = "```yaml\naction:\n  function: move\n  parameters:\n    direction: left\n    distance: 1\n```";
        assert_eq!(parse(reply).unwrap(), move_of("left", 1.0));
    }

    #[test]
    fn first_block_wins() {
        let reply = "```yml\naction:\n  function: move\n  parameters: {direction: forward, distance: 0.1}\n```\n\
                     ```yml\naction:\n  function: move\n  parameters: {direction: backward, distance: 0.9}\n```";
        assert_eq!(parse(reply).unwrap(), move_of("forward", 0.1));
    }

    #[test]
    fn untagged_fence_is_not_a_block() {
        assert_eq!(
            extract_block("```\naction: {}\n```"),
            Err(ParseError::NoStructuredBlock)
        );
        assert_eq!(extract_block("no block at all"), Err(ParseError::NoStructuredBlock));
    }

    #[test]
    fn unclosed_fence_is_not_a_block() {
        assert_eq!(
            extract_block("```yml\naction:\n  function: move\n"),
            Err(ParseError::NoStructuredBlock)
        );
    }

    #[test]
    fn invalid_yaml_is_malformed() {
        assert!(matches!(
            parse("```yml\naction: [unclosed\n```"),
            Err(ParseError::MalformedBlock(_))
        ));
    }

    #[test]
    fn missing_or_scalar_action_is_malformed() {
        assert!(matches!(
            decode_block("reason: none"),
            Err(ParseError::MalformedBlock(_))
        ));
        assert!(matches!(
            decode_block("action: move"),
            Err(ParseError::MalformedBlock(_))
        ));
        assert!(matches!(decode_block(""), Err(ParseError::MalformedBlock(_))));
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let block = "action:\n  function: move\n  parameters:\n    direction: right\n    distance: \"0.25\"\n    jumping: \"true\"";
        assert_eq!(
            decode_block(block).unwrap(),
            Instruction::Move {
                direction: "right".into(),
                distance: 0.25,
                jumping: true,
            }
        );
    }

    #[test]
    fn missing_parameters_default_to_zero_values() {
        assert_eq!(
            decode_block("action:\n  function: move").unwrap(),
            move_of("", 0.0)
        );
    }

    #[test]
    fn negative_and_non_finite_distances_read_as_zero() {
        let neg = "action: {function: move, parameters: {direction: forward, distance: -3}}";
        let nan = "action: {function: move, parameters: {direction: forward, distance: .nan}}";
        let junk = "action: {function: move, parameters: {direction: forward, distance: far}}";
        assert_eq!(decode_block(neg).unwrap(), move_of("forward", 0.0));
        assert_eq!(decode_block(nan).unwrap(), move_of("forward", 0.0));
        assert_eq!(decode_block(junk).unwrap(), move_of("forward", 0.0));
    }

    #[test]
    fn unknown_function_is_carried_through() {
        assert_eq!(
            decode_block("action:\n  function: dance").unwrap(),
            Instruction::Unknown {
                function: "dance".into()
            }
        );
    }

    #[test]
    fn other_verbs_decode() {
        let craft = "action:\n  function: craft_item\n  parameters:\n    item: torch\n    count: 4\n    ingredients: [stick, coal]";
        assert_eq!(
            decode_block(craft).unwrap(),
            Instruction::CraftItem {
                item: "torch".into(),
                count: 4,
                ingredients: vec!["stick".into(), "coal".into()],
            }
        );
        let attack = "action:\n  function: attack_entity\n  parameters: {entity_type: Zombie, weapon: item.minecraft.iron_sword}";
        assert_eq!(
            decode_block(attack).unwrap(),
            Instruction::AttackEntity {
                entity_type: "Zombie".into(),
                weapon: "item.minecraft.iron_sword".into(),
            }
        );
        let wake = "action:\n  function: player_wake\n  parameters: {wake_immediately: true}";
        assert_eq!(
            decode_block(wake).unwrap(),
            Instruction::PlayerWake {
                wake_immediately: true
            }
        );
    }

    #[test]
    fn combat_and_farming_verbs_decode() {
        let anvil = "action:\n  function: anvil_repair\n  parameters:\n    result_item: item.minecraft.iron_pickaxe\n    left_input: item.minecraft.iron_pickaxe\n    right_input: item.minecraft.iron_ingot";
        assert_eq!(
            decode_block(anvil).unwrap(),
            Instruction::AnvilRepair {
                result_item: "item.minecraft.iron_pickaxe".into(),
                left_input: "item.minecraft.iron_pickaxe".into(),
                right_input: "item.minecraft.iron_ingot".into(),
            }
        );
        let container = "action:\n  function: container_event\n  parameters: {container: ChestMenu}";
        assert_eq!(
            decode_block(container).unwrap(),
            Instruction::ContainerEvent {
                container: "ChestMenu".into()
            }
        );
        let nock = "action:\n  function: start_drawing_bow\n  parameters: {bow: item.minecraft.bow}";
        assert_eq!(
            decode_block(nock).unwrap(),
            Instruction::StartDrawingBow {
                bow: "item.minecraft.bow".into()
            }
        );
        let loose = "action:\n  function: release_arrow\n  parameters: {bow: item.minecraft.bow, charge: 15, power: 0.75}";
        assert_eq!(
            decode_block(loose).unwrap(),
            Instruction::ReleaseArrow {
                bow: "item.minecraft.bow".into(),
                charge: 15,
                power: 0.75,
            }
        );
        let bonemeal = "action:\n  function: use_bonemeal\n  parameters:\n    target_block: block.minecraft.wheat\n    position: x=3, y=64, z=-7";
        assert_eq!(
            decode_block(bonemeal).unwrap(),
            Instruction::UseBonemeal {
                target_block: "block.minecraft.wheat".into(),
                position: "x=3, y=64, z=-7".into(),
            }
        );
    }

    #[test]
    fn fenced_reply_decodes_like_its_bare_block() {
        let blocks = [
            "action:\n  function: move\n  parameters: {direction: left, distance: 0.4, jumping: true}",
            "action:\n  function: use_item\n  parameters: {item: item.minecraft.bread}",
            "action:\n  function: interact_block\n  parameters: {block: block.minecraft.oak_door, interaction: right_click}",
            "action:\n  function: attack_entity\n  parameters: {entity_type: Zombie, weapon: item.minecraft.stone_sword}",
            "action:\n  function: craft_item\n  parameters: {item: torch, count: 4, ingredients: [stick, coal]}",
            "action:\n  function: pickup_item\n  parameters: {item: item.minecraft.apple, count: \"2\"}",
            "action:\n  function: destroy_item\n  parameters: {item: item.minecraft.wooden_hoe}",
            "action:\n  function: player_sleep\n  parameters: {bed_position: \"x=1, y=64, z=2\"}",
            "action:\n  function: player_wake\n  parameters: {wake_immediately: false}",
            "action:\n  function: anvil_repair\n  parameters: {result_item: a, left_input: b, right_input: c}",
            "action:\n  function: container_event\n  parameters: {container: FurnaceMenu}",
            "action:\n  function: start_drawing_bow\n  parameters: {bow: item.minecraft.bow}",
            "action:\n  function: release_arrow\n  parameters: {bow: item.minecraft.bow, charge: 20, power: 1.0}",
            "action:\n  function: use_bonemeal\n  parameters: {target_block: block.minecraft.carrots, position: \"x=0, y=63, z=0\"}",
            "action:\n  function: dance",
        ];
        for block in blocks {
            let bare = decode_block(block).unwrap();
            assert_eq!(parse(&format!("```yml\n{block}\n```")).unwrap(), bare, "{block}");
            assert_eq!(parse(&format!("text\n```yaml\n{block}\n```\nmore")).unwrap(), bare);
        }
    }

    #[test]
    fn non_mapping_parameters_are_malformed() {
        assert!(matches!(
            decode_block("action:\n  function: move\n  parameters: [1, 2]"),
            Err(ParseError::MalformedBlock(_))
        ));
    }
}
