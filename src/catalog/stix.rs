use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;

/// A parsed `attack-pattern` STIX object: external code, display name,
/// description, and the comma-joined sorted-deduplicated tactic list
/// (spec §4.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackPattern {
    pub external_code: String,
    pub name: String,
    pub description: Option<String>,
    pub tactics: String,
}

#[derive(Debug, Deserialize)]
struct StixBundle {
    objects: Vec<Value>,
}

/// Parses a STIX bundle JSON document into the attack-pattern objects it
/// contains, skipping anything else (grounded on `mitre_sync.py`'s
/// `sync_mitre_from_github`).
pub fn parse_bundle(bundle_json: &Value) -> Vec<AttackPattern> {
    let bundle: StixBundle = match serde_json::from_value(bundle_json.clone()) {
        Ok(b) => b,
        Err(_) => return Vec::new(),
    };

    bundle
        .objects
        .into_iter()
        .filter(|obj| obj["type"].as_str() == Some("attack-pattern"))
        .filter_map(|obj| {
            let external_code = extract_tech_id(&obj["external_references"])?;
            let name = obj["name"].as_str().unwrap_or("unknown").to_string();
            let description = obj["description"].as_str().map(str::to_string);
            let tactics = extract_tactics(&obj["kill_chain_phases"]);
            Some(AttackPattern {
                external_code,
                name,
                description,
                tactics,
            })
        })
        .collect()
}

fn extract_tech_id(refs: &Value) -> Option<String> {
    refs.as_array()?.iter().find_map(|r| {
        if r["source_name"].as_str() == Some("mitre-attack") {
            r["external_id"].as_str().map(str::to_string)
        } else {
            None
        }
    })
}

fn extract_tactics(phases: &Value) -> String {
    let mut names: BTreeSet<String> = BTreeSet::new();
    if let Some(items) = phases.as_array() {
        for phase in items {
            if phase["kill_chain_name"].as_str() != Some("mitre-attack") {
                continue;
            }
            if let Some(name) = phase["phase_name"].as_str() {
                names.insert(name.to_string());
            }
        }
    }
    names.into_iter().collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_attack_pattern_with_sorted_deduped_tactics() {
        let bundle = json!({
            "objects": [
                {
                    "type": "attack-pattern",
                    "name": "Command and Scripting Interpreter",
                    "description": "Adversaries may abuse...",
                    "external_references": [
                        {"source_name": "mitre-attack", "external_id": "T1059"}
                    ],
                    "kill_chain_phases": [
                        {"kill_chain_name": "mitre-attack", "phase_name": "execution"},
                        {"kill_chain_name": "mitre-attack", "phase_name": "execution"},
                        {"kill_chain_name": "mitre-attack", "phase_name": "defense-evasion"}
                    ]
                },
                {"type": "malware", "name": "ignored"}
            ]
        });

        let patterns = parse_bundle(&bundle);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].external_code, "T1059");
        assert_eq!(patterns[0].tactics, "defense-evasion,execution");
    }

    #[test]
    fn skips_objects_without_mitre_attack_reference() {
        let bundle = json!({
            "objects": [
                {"type": "attack-pattern", "name": "no-ref", "external_references": []}
            ]
        });
        assert!(parse_bundle(&bundle).is_empty());
    }
}
