//! JNI bridge. Every entry point takes a JSON string and returns a JSON
//! envelope: `{"ok":true,"result":...}` or `{"ok":false,"error":"..."}`.

use engine::api::{simulate_duel, simulate_duel_many, DuelConfig};
use engine::content::{builtin_encounter, parse_encounter, Format};
use engine::{AttackRequest, Dice, Encounter};
use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use serde::Deserialize;
use serde_json::{json, Value};

/// Attack input: an encounter (inline JSON or built-in id), the request and
/// either a seed or a scripted roll list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttackInput {
    #[serde(default)]
    encounter: Option<Value>,
    #[serde(default)]
    encounter_id: Option<String>,
    request: AttackRequest,
    #[serde(default)]
    seed: u64,
    #[serde(default)]
    dice: Vec<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitiativeInput {
    #[serde(default)]
    encounter: Option<Value>,
    #[serde(default)]
    encounter_id: Option<String>,
    #[serde(default)]
    seed: u64,
}

fn build_encounter(inline: Option<Value>, id: Option<&str>) -> Result<Encounter, String> {
    let file = match inline {
        Some(v) => {
            let text = v.to_string();
            parse_encounter(&text, Format::Json).map_err(|e| format!("{:#}", e))?
        }
        None => builtin_encounter(id.unwrap_or("temple_skirmish")).map_err(|e| format!("{:#}", e))?,
    };
    file.build().map_err(|e| format!("{:#}", e))
}

fn dice_for(seed: u64, scripted: Vec<u8>) -> Dice {
    if scripted.is_empty() {
        Dice::from_seed(seed)
    } else {
        Dice::from_scripted(scripted)
    }
}

/// Resolve one attack, auto-defending. Rule errors come back as `Err`.
pub fn resolve_attack_json(input: &str) -> Result<Value, String> {
    let input: AttackInput =
        serde_json::from_str(input).map_err(|e| format!("invalid_config: {}", e))?;
    let encounter = build_encounter(input.encounter, input.encounter_id.as_deref())?;
    let mut dice = dice_for(input.seed, input.dice);
    let report = encounter
        .resolve_attack(&mut dice, &input.request)
        .map_err(|e| e.to_string())?;
    serde_json::to_value(report).map_err(|e| e.to_string())
}

pub fn roll_initiative_json(input: &str) -> Result<Value, String> {
    let input: InitiativeInput =
        serde_json::from_str(input).map_err(|e| format!("invalid_config: {}", e))?;
    let mut encounter = build_encounter(input.encounter, input.encounter_id.as_deref())?;
    let mut dice = Dice::from_seed(input.seed);
    let rolls = encounter
        .roll_initiative_all(&mut dice)
        .map_err(|e| e.to_string())?;
    Ok(json!({
        "rolls": rolls
            .into_iter()
            .map(|(id, roll)| json!({ "id": id, "roll": roll }))
            .collect::<Vec<_>>(),
        "order": encounter.turn_order(),
    }))
}

/// `{"samples": n, ...DuelConfig}` runs many duels; without `samples`, one.
pub fn simulate_duel_json(input: &str) -> Result<Value, String> {
    let mut root: Value =
        serde_json::from_str(input).map_err(|e| format!("invalid_config: {}", e))?;
    let samples = root
        .as_object_mut()
        .and_then(|obj| obj.remove("samples"))
        .and_then(|v| v.as_u64());
    let cfg: DuelConfig =
        serde_json::from_value(root).map_err(|e| format!("invalid_config: {}", e))?;
    let samples = samples
        .map(|n| u32::try_from(n).map_err(|_| format!("invalid_config: samples {} out of range", n)))
        .transpose()?;
    match samples {
        Some(n) => simulate_duel_many(cfg, n)
            .map_err(|e| format!("{:#}", e))
            .and_then(|stats| serde_json::to_value(stats).map_err(|e| e.to_string())),
        None => simulate_duel(cfg)
            .map_err(|e| format!("{:#}", e))
            .and_then(|res| serde_json::to_value(res).map_err(|e| e.to_string())),
    }
}

fn envelope(result: Result<Value, String>) -> String {
    let payload = match result {
        Ok(value) => json!({ "ok": true, "result": value }),
        Err(e) => json!({ "ok": false, "error": e }),
    };
    payload.to_string()
}

fn call(env: &mut JNIEnv, json: &JString, f: fn(&str) -> Result<Value, String>) -> jstring {
    let result = match env.get_string(json) {
        Ok(s) => f(&String::from(s)),
        Err(e) => Err(e.to_string()),
    };
    into_jstring(env, envelope(result))
}

fn into_jstring(env: &mut JNIEnv, s: String) -> jstring {
    match env.new_string(s) {
        Ok(js) => js.into_raw(),
        // A pending Java exception explains the failure.
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "system" fn Java_com_holylands_Ffi_version(mut env: JNIEnv, _class: JClass) -> jstring {
    into_jstring(
        &mut env,
        format!("holy-ffi {}", env!("CARGO_PKG_VERSION")),
    )
}

#[no_mangle]
pub extern "system" fn Java_com_holylands_Ffi_resolveAttackJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    call(&mut env, &json, resolve_attack_json)
}

#[no_mangle]
pub extern "system" fn Java_com_holylands_Ffi_rollInitiativeJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    call(&mut env, &json, roll_initiative_json)
}

#[no_mangle]
pub extern "system" fn Java_com_holylands_Ffi_simulateDuelJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    call(&mut env, &json, simulate_duel_json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_wraps_errors() {
        let out: Value = serde_json::from_str(&envelope(Err("boom \"x\"".into()))).unwrap();
        assert_eq!(out["ok"], false);
        assert_eq!(out["error"], "boom \"x\"");
    }

    #[test]
    fn bad_json_is_reported() {
        let err = resolve_attack_json("{not json").unwrap_err();
        assert!(err.starts_with("invalid_config"));
    }
}
