//! Custom SIT import from rule-pack text.
//!
//! This is a pattern extractor, not an XML parser: it pulls the entity id
//! and the default en-us name/description out of the text and fills the rest
//! with fixed placeholder values.

use purviewx_types::{CustomSit, WizardData};
use regex::Regex;

const PLACEHOLDER_KEYWORDS: [&str; 2] = ["mock-keyword-1", "mock-keyword-2"];
const PLACEHOLDER_CONFIDENCE: u32 = 75;

#[derive(Debug, thiserror::Error)]
pub enum SitImportError {
    #[error("invalid SIT format: missing <RulePack> or <Entity> tag")]
    MissingRulePack,

    #[error("could not find required fields (Entity ID, Name, Description) in the rule pack")]
    MissingFields,

    #[error("a custom SIT with id {0} is already imported")]
    DuplicateId(String),

    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

pub fn parse_sit_rule_pack(text: &str) -> Result<CustomSit, SitImportError> {
    if !text.contains("<RulePack") || !text.contains("<Entity") {
        return Err(SitImportError::MissingRulePack);
    }

    let id = capture(r#"<Entity id="([^"]+)""#, text)?;
    let name = capture(r#"<Name default="true" langcode="en-us">([^<]+)</Name>"#, text)?;
    let description = capture(
        r#"<Description default="true" langcode="en-us">([^<]+)</Description>"#,
        text,
    )?;

    let (Some(id), Some(name), Some(description)) = (id, name, description) else {
        return Err(SitImportError::MissingFields);
    };

    Ok(CustomSit {
        id,
        name,
        description,
        keywords: PLACEHOLDER_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        confidence: PLACEHOLDER_CONFIDENCE,
        xml_content: text.to_string(),
    })
}

fn capture(pattern: &str, text: &str) -> Result<Option<String>, SitImportError> {
    let re = Regex::new(pattern)?;
    Ok(re
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string()))
}

/// Append `sit` to the snapshot, refusing a second SIT with the same id.
pub fn add_custom_sit(data: &mut WizardData, sit: CustomSit) -> Result<(), SitImportError> {
    if data.custom_sits.iter().any(|s| s.id == sit.id) {
        return Err(SitImportError::DuplicateId(sit.id));
    }
    data.custom_sits.push(sit);
    Ok(())
}
