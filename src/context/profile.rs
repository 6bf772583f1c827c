//! Profile context
//!
//! Renders the external profile into sectioned prompt text. A leaf counts
//! as set only if it is non-empty and does not start with the template
//! wording for its field (see [`placeholder`]); unset leaves never reach
//! the output and a section with no set leaves is dropped entirely.
//!
//! Field order is fixed: basic info (name, age, occupation, then any other
//! keys), personality, interests, goals, life situation, advice
//! preferences, notes.

use crate::storage::ExternalProfile;
use serde_json::{json, Map, Value};

/// Template wording each field starts with until the user edits it
pub mod placeholder {
    pub const NAME: &str = "あなたの";
    pub const AGE: &str = "年齢";
    pub const OCCUPATION: &str = "職業";
    pub const TRAITS: &str = "性格の特徴";
    pub const VALUES: &str = "大切にしている";
    pub const INTERESTS: &str = "趣味";
    pub const SHORT_TERM: &str = "短期目標";
    pub const LONG_TERM: &str = "長期目標";
    pub const CHALLENGES: &str = "現在の課題";
    pub const LIFE_SITUATION: [&str; 3] = ["家族構成", "仕事スタイル", "日常のルーティン"];
    pub const ADVICE_STYLE: &str = "どんな";
    pub const FOCUS_AREAS: &str = "特に重視";
    pub const NOTES: &str = "その他";
}

/// Known `basic_info` keys: (key, label, placeholder)
const BASIC_FIELDS: [(&str, &str, &str); 3] = [
    ("name", "名前", placeholder::NAME),
    ("age", "年齢", placeholder::AGE),
    ("occupation", "職業", placeholder::OCCUPATION),
];

/// A value is set if non-empty and not still the template wording
pub fn is_set(value: &str, placeholder: &str) -> bool {
    !value.is_empty() && !value.starts_with(placeholder)
}

fn set_items<'a>(items: &'a [String], placeholder: &str) -> Vec<&'a str> {
    items
        .iter()
        .map(String::as_str)
        .filter(|v| is_set(v, placeholder))
        .collect()
}

/// Display text of a free-form leaf; `None` for null / false / empty lists
fn leaf_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(leaf_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        other => Some(other.to_string()),
    }
}

fn section(header: &str, lines: Vec<String>) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    Some(format!("【{}】\n{}", header, lines.join("\n")))
}

fn basic_info_lines(info: &Map<String, Value>) -> Vec<String> {
    let mut lines = Vec::new();

    for (key, label, wording) in BASIC_FIELDS {
        let Some(text) = info.get(key).and_then(leaf_text) else {
            continue;
        };
        if is_set(&text, wording) && text != key {
            lines.push(format!("- {}: {}", label, text));
        }
    }

    for (key, value) in info {
        if BASIC_FIELDS.iter().any(|(known, _, _)| known == key) {
            continue;
        }
        if let Some(text) = leaf_text(value) {
            if !text.is_empty() && text != *key {
                lines.push(format!("- {}: {}", key, text));
            }
        }
    }

    lines
}

fn life_situation_lines(situation: &Map<String, Value>) -> Vec<String> {
    let mut lines = Vec::new();

    for (key, value) in situation {
        if let ("challenges", Value::Array(items)) = (key.as_str(), value) {
            let challenges: Vec<&str> = items
                .iter()
                .filter_map(Value::as_str)
                .filter(|c| is_set(c, placeholder::CHALLENGES))
                .collect();
            if !challenges.is_empty() {
                lines.push(format!("- 現在の課題: {}", challenges.join(", ")));
            }
            continue;
        }

        let Some(text) = leaf_text(value) else {
            continue;
        };
        if placeholder::LIFE_SITUATION
            .iter()
            .all(|wording| is_set(&text, wording))
        {
            lines.push(format!("- {}: {}", key, text));
        }
    }

    lines
}

/// Build the sectioned profile context; empty if nothing is set
pub fn profile_context(profile: &ExternalProfile) -> String {
    let mut sections: Vec<Option<String>> = Vec::new();

    sections.push(section("基本情報", basic_info_lines(&profile.basic_info)));

    let mut personality = Vec::new();
    let traits = set_items(&profile.personality.traits, placeholder::TRAITS);
    if !traits.is_empty() {
        personality.push(format!("- 性格: {}", traits.join(", ")));
    }
    let values = set_items(&profile.personality.values, placeholder::VALUES);
    if !values.is_empty() {
        personality.push(format!("- 価値観: {}", values.join(", ")));
    }
    sections.push(section("性格・価値観", personality));

    let interests = set_items(&profile.interests_and_hobbies, placeholder::INTERESTS);
    let interest_lines = if interests.is_empty() {
        Vec::new()
    } else {
        vec![format!("- {}", interests.join(", "))]
    };
    sections.push(section("興味・趣味", interest_lines));

    let mut goals = Vec::new();
    let short_term = set_items(&profile.goals.short_term, placeholder::SHORT_TERM);
    if !short_term.is_empty() {
        goals.push(format!("- 短期目標: {}", short_term.join(", ")));
    }
    let long_term = set_items(&profile.goals.long_term, placeholder::LONG_TERM);
    if !long_term.is_empty() {
        goals.push(format!("- 長期目標: {}", long_term.join(", ")));
    }
    sections.push(section("目標", goals));

    sections.push(section("生活状況", life_situation_lines(&profile.life_situation)));

    let mut advice = Vec::new();
    if is_set(&profile.preferences.advice_style, placeholder::ADVICE_STYLE) {
        advice.push(format!(
            "- 好むアドバイススタイル: {}",
            profile.preferences.advice_style
        ));
    }
    let focus = set_items(&profile.preferences.focus_areas, placeholder::FOCUS_AREAS);
    if !focus.is_empty() {
        advice.push(format!("- 重視する分野: {}", focus.join(", ")));
    }
    sections.push(section("アドバイス設定", advice));

    let notes = if is_set(&profile.notes, placeholder::NOTES) {
        vec![format!("- {}", profile.notes)]
    } else {
        Vec::new()
    };
    sections.push(section("その他", notes));

    sections.into_iter().flatten().collect::<Vec<_>>().join("\n\n")
}

/// One-glance summary of how much of the profile is filled in
pub fn profile_summary(profile: &ExternalProfile) -> String {
    if profile.is_empty() {
        return "プロフィールが設定されていません。".to_string();
    }

    let mut parts = Vec::new();
    for (key, label, wording) in BASIC_FIELDS {
        if let Some(text) = profile.basic_info.get(key).and_then(leaf_text) {
            if is_set(&text, wording) {
                parts.push(format!("{}: {}", label, text));
            }
        }
    }

    let goal_count = set_items(&profile.goals.short_term, placeholder::SHORT_TERM).len()
        + set_items(&profile.goals.long_term, placeholder::LONG_TERM).len();
    if goal_count > 0 {
        parts.push(format!("設定済み目標: {}個", goal_count));
    }

    let interest_count = set_items(&profile.interests_and_hobbies, placeholder::INTERESTS).len();
    if interest_count > 0 {
        parts.push(format!("興味・趣味: {}個", interest_count));
    }

    if parts.is_empty() {
        "プロフィールの詳細が設定されていません。".to_string()
    } else {
        parts.join("\n")
    }
}

/// A fresh profile whose every field still holds its template wording
pub fn placeholder_template() -> ExternalProfile {
    serde_json::from_value(json!({
        "basic_info": {
            "name": "あなたの名前",
            "age": "年齢",
            "occupation": "職業"
        },
        "personality": {
            "traits": ["性格の特徴1", "性格の特徴2"],
            "values": ["大切にしている価値観"]
        },
        "interests_and_hobbies": ["趣味1", "趣味2"],
        "goals": {
            "short_term": ["短期目標1"],
            "long_term": ["長期目標1"]
        },
        "life_situation": {
            "family": "家族構成",
            "work_style": "仕事スタイル",
            "daily_routine": "日常のルーティン",
            "challenges": ["現在の課題1"]
        },
        "preferences": {
            "advice_style": "どんなアドバイスが欲しいか",
            "focus_areas": ["特に重視したい分野"]
        },
        "notes": "その他のメモ"
    }))
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_profile_has_no_context() {
        assert_eq!(profile_context(&ExternalProfile::default()), "");
    }

    #[test]
    fn test_all_placeholders_have_no_context() {
        let template = placeholder_template();
        assert!(!template.is_empty());
        assert_eq!(profile_context(&template), "");
    }

    #[test]
    fn test_field_equal_to_its_key_is_unset() {
        let mut profile = ExternalProfile::default();
        profile.basic_info.insert("hometown".into(), json!("hometown"));
        profile.basic_info.insert("blood_type".into(), json!("A"));

        assert_eq!(profile_context(&profile), "【基本情報】\n- blood_type: A");
    }

    #[test]
    fn test_mixed_profile_renders_in_fixed_order() {
        let mut profile = placeholder_template();
        profile.basic_info.insert("age".into(), json!("34"));
        profile.personality.values.push("誠実さ".into());
        profile.goals.long_term = vec!["本を出す".into(), "長期目標2".into()];
        profile.life_situation.insert("challenges".into(), json!(["睡眠不足", "現在の課題2"]));
        profile.life_situation.insert("family".into(), json!("妻と二人暮らし"));
        profile.preferences.focus_areas = vec!["健康".into()];
        profile.notes = "朝型に戻したい".into();

        let expected = "【基本情報】\n- 年齢: 34\n\n\
                        【性格・価値観】\n- 価値観: 誠実さ\n\n\
                        【目標】\n- 長期目標: 本を出す\n\n\
                        【生活状況】\n- family: 妻と二人暮らし\n- 現在の課題: 睡眠不足\n\n\
                        【アドバイス設定】\n- 重視する分野: 健康\n\n\
                        【その他】\n- 朝型に戻したい";
        assert_eq!(profile_context(&profile), expected);
    }

    #[test]
    fn test_free_form_sections_follow_document_order() {
        let profile: ExternalProfile = serde_json::from_str(
            r#"{
                "basic_info": {"hometown": "札幌", "name": "山田", "blood_type": "A"},
                "life_situation": {
                    "family": "妻と二人",
                    "work_style": "在宅",
                    "challenges": ["睡眠不足"]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            profile_context(&profile),
            "【基本情報】\n- 名前: 山田\n- hometown: 札幌\n- blood_type: A\n\n\
             【生活状況】\n- family: 妻と二人\n- work_style: 在宅\n- 現在の課題: 睡眠不足"
        );
    }

    #[test]
    fn test_null_leaf_keeps_other_fields() {
        let profile: ExternalProfile =
            serde_json::from_str(r#"{"basic_info": {"name": "山田花子"}, "notes": null}"#).unwrap();
        assert_eq!(profile_context(&profile), "【基本情報】\n- 名前: 山田花子");
    }

    #[test]
    fn test_advice_style_and_focus_share_one_header() {
        let mut profile = ExternalProfile::default();
        profile.preferences.advice_style = "率直に".into();
        profile.preferences.focus_areas = vec!["仕事".into(), "特に重視したい分野".into()];

        assert_eq!(
            profile_context(&profile),
            "【アドバイス設定】\n- 好むアドバイススタイル: 率直に\n- 重視する分野: 仕事"
        );
    }

    #[test]
    fn test_interests_only() {
        let mut profile = ExternalProfile::default();
        profile.interests_and_hobbies = vec!["登山".into(), "趣味2".into(), "".into(), "写真".into()];
        assert_eq!(profile_context(&profile), "【興味・趣味】\n- 登山, 写真");
    }

    #[test]
    fn test_is_set() {
        assert!(is_set("山田", placeholder::NAME));
        assert!(!is_set("あなたの名前", placeholder::NAME));
        assert!(!is_set("", placeholder::NAME));
    }

    #[test]
    fn test_summary() {
        assert_eq!(
            profile_summary(&ExternalProfile::default()),
            "プロフィールが設定されていません。"
        );
        assert_eq!(
            profile_summary(&placeholder_template()),
            "プロフィールの詳細が設定されていません。"
        );

        let mut profile = placeholder_template();
        profile.basic_info.insert("name".into(), json!("山田花子"));
        profile.goals.short_term.push("毎朝走る".into());
        profile.goals.long_term.push("フルマラソン".into());
        profile.interests_and_hobbies.push("ランニング".into());

        assert_eq!(
            profile_summary(&profile),
            "名前: 山田花子\n設定済み目標: 2個\n興味・趣味: 1個"
        );
    }
}
