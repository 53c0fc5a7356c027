//! Advisory condition model for VRCMRD, a moderation assistant for VR-world
//! instances.
//!
//! An advisory pairs a boolean condition tree over user attributes with a
//! leveled message. This crate covers the whole life of one:
//!
//! ```text
//! parse_advisories(json) → Vec<Advisory> → validate(adv) → ValidationResult
//!                                        → normalize(adv) → serialize_advisories
//! evaluate(condition, user) → bool    build_notice(adv, user) → Notice
//! edit::* (pure structural edits)      template::resolve(message, context)
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use vrcmrd_advisories::{Condition, UserAttributes, evaluate};
//! use vrcmrd_advisories::enums::TrustRank;
//!
//! let condition = Condition::AllOf(vec![
//!     Condition::TrustRankAtMost(TrustRank::Visitor),
//!     Condition::AgeNotVerified,
//! ]);
//! let user = UserAttributes {
//!     username: "Ann".into(),
//!     trust_rank: Some(TrustRank::Nuisance),
//!     ..UserAttributes::default()
//! };
//! assert!(evaluate(&condition, &user));
//! ```
//!
//! The crate emits [`tracing`] events but never installs a subscriber.

pub mod edit;
pub mod enums;
pub mod error;
pub mod evaluate;
pub mod normalize;
pub mod parse;
pub mod primitives;
pub mod serialize;
pub mod session;
pub mod settings;
pub mod store;
pub mod template;
pub mod types;
pub mod validate;

pub use error::*;
pub use types::*;

// Re-export entry-point functions at the crate root for convenience.
pub use evaluate::{evaluate, evaluate_with};
pub use normalize::normalize;
pub use parse::{parse_advisories, parse_advisories_yaml};
pub use serialize::{serialize_advisories, serialize_advisories_yaml};
pub use template::resolve;
pub use validate::validate;

/// Result of the [`load`] convenience entry point.
#[derive(Debug)]
pub struct LoadResult {
    /// The normalized advisories, in stored order.
    pub advisories: Vec<Advisory>,
    /// Non-fatal warnings produced during validation.
    pub warnings: Vec<Diagnostic>,
}

/// Convenience entry point composing parse → validate → normalize over a
/// stored advisory list.
///
/// # Errors
///
/// Returns `Err(Vec<AdvisoryError>)` if parsing fails or validation finds errors.
///
/// # Example
///
/// ```rust
/// let json = r#"[{
///     "id": "vrcmrd_adv_4f9KqXw2ZpRt",
///     "level": 3,
///     "message_template": "{{:username:}} joined on a {{:account_age_days:}}-day-old account",
///     "active": true,
///     "condition": {"type": "AccountAgeAtMostDays", "data": 7}
/// }]"#;
///
/// match vrcmrd_advisories::load(json) {
///     Ok(result) => println!("Loaded with {} warnings", result.warnings.len()),
///     Err(errors) => eprintln!("{} errors", errors.len()),
/// }
/// ```
pub fn load(input: &str) -> Result<LoadResult, Vec<AdvisoryError>> {
    let advisories = parse::parse_advisories(input).map_err(|e| vec![AdvisoryError::Parse(e)])?;

    let result = validate::validate_all(&advisories);
    if !result.errors.is_empty() {
        return Err(result
            .errors
            .into_iter()
            .map(AdvisoryError::Validation)
            .collect());
    }

    Ok(LoadResult {
        advisories: advisories.into_iter().map(normalize::normalize).collect(),
        warnings: result.warnings,
    })
}
