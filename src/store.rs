//! Advisory persistence boundary and the in-memory advisory set.

use crate::enums::ConditionKind;
use crate::error::{StoreError, StoreErrorKind};
use crate::parse::parse_advisories;
use crate::primitives::contains_kind;
use crate::serialize::serialize_advisories;
use crate::types::{Advisory, Notice};
use rand::Rng;
use tracing::{debug, warn};

/// Config key the advisory list is stored under, as a JSON array.
pub const ADVISORIES_CONFIG_KEY: &str = "my_advisories";

pub const ADVISORY_ID_PREFIX: &str = "vrcmrd_adv_";

const ADVISORY_ID_RANDOM_LEN: usize = 12;

/// Bitcoin Base58: no `0`, `O`, `I` or `l`.
const BASE58_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// A fresh advisory id: the prefix plus 12 random Base58 characters.
pub fn generate_advisory_id() -> String {
    let mut rng = rand::thread_rng();
    let mut id = String::with_capacity(ADVISORY_ID_PREFIX.len() + ADVISORY_ID_RANDOM_LEN);
    id.push_str(ADVISORY_ID_PREFIX);
    for _ in 0..ADVISORY_ID_RANDOM_LEN {
        let i = rng.gen_range(0..BASE58_ALPHABET.len());
        id.push(BASE58_ALPHABET[i] as char);
    }
    id
}

// ─── Backend boundary ───────────────────────────────────────────────────────

/// The advisory operations a backend collaborator offers.
pub trait AdvisoryBackend {
    fn advisories(&self) -> Vec<Advisory>;

    fn advisory(&self, id: &str) -> Option<Advisory>;

    /// Stores a new advisory. Fails if the id is already taken.
    fn add_advisory(&mut self, advisory: Advisory) -> Result<(), StoreError>;

    /// Replaces the advisory with the same id. Fails if there is none.
    fn update_advisory(&mut self, advisory: Advisory) -> Result<(), StoreError>;

    fn remove_advisory(&mut self, id: &str) -> Result<(), StoreError>;

    fn generate_advisory_id(&self) -> String {
        generate_advisory_id()
    }
}

// ─── AdvisoryStore ──────────────────────────────────────────────────────────

/// In-memory advisory set with derived lookups and notice history.
#[derive(Clone, Debug, Default)]
pub struct AdvisoryStore {
    all: Vec<Advisory>,
    active: Vec<Advisory>,
    has_group_membership_advisory: bool,
    notices: Vec<Notice>,
}

impl AdvisoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the stored config value. A missing value is an empty set.
    pub fn from_config_value(value: Option<&str>) -> Result<Self, StoreError> {
        let mut store = AdvisoryStore::new();
        if let Some(json) = value {
            let advisories = parse_advisories(json).map_err(|e| StoreError {
                kind: StoreErrorKind::Storage,
                message: format!("stored advisories are unreadable: {}", e),
                advisory_id: None,
            })?;
            store.set(advisories);
        }
        Ok(store)
    }

    /// The JSON value to store under [`ADVISORIES_CONFIG_KEY`].
    pub fn to_config_value(&self) -> Result<String, StoreError> {
        serialize_advisories(&self.all).map_err(|e| StoreError {
            kind: StoreErrorKind::Storage,
            message: e.message,
            advisory_id: None,
        })
    }

    /// Replaces the whole set and recomputes the active list.
    pub fn set(&mut self, advisories: Vec<Advisory>) {
        self.active = advisories.iter().filter(|a| a.active).cloned().collect();
        self.has_group_membership_advisory = self
            .active
            .iter()
            .any(|a| contains_kind(&a.condition, ConditionKind::IsGroupMember));
        self.all = advisories;
        debug!(
            total = self.all.len(),
            active = self.active.len(),
            group_membership = self.has_group_membership_advisory,
            "advisory set replaced"
        );
    }

    pub fn all(&self) -> &[Advisory] {
        &self.all
    }

    /// Active advisories, in stored order.
    pub fn active(&self) -> &[Advisory] {
        &self.active
    }

    /// Whether any active advisory tests group membership, i.e. whether
    /// user group lists need fetching at all.
    pub fn has_group_membership_advisory(&self) -> bool {
        self.has_group_membership_advisory
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn clear_notices(&mut self) {
        self.notices.clear();
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.all.iter().position(|a| a.id == id)
    }
}

impl AdvisoryBackend for AdvisoryStore {
    fn advisories(&self) -> Vec<Advisory> {
        self.all.clone()
    }

    fn advisory(&self, id: &str) -> Option<Advisory> {
        self.all.iter().find(|a| a.id == id).cloned()
    }

    fn add_advisory(&mut self, advisory: Advisory) -> Result<(), StoreError> {
        if self.position(&advisory.id).is_some() {
            warn!(id = %advisory.id, "rejected duplicate advisory id");
            return Err(store_error(
                StoreErrorKind::DuplicateId,
                "Advisory with this ID already exists",
                &advisory.id,
            ));
        }
        let mut advisories = self.all.clone();
        advisories.push(advisory);
        self.set(advisories);
        Ok(())
    }

    fn update_advisory(&mut self, advisory: Advisory) -> Result<(), StoreError> {
        let Some(pos) = self.position(&advisory.id) else {
            warn!(id = %advisory.id, "update for unknown advisory");
            return Err(store_error(
                StoreErrorKind::UnknownId,
                "Advisory with this ID does not exist",
                &advisory.id,
            ));
        };
        let mut advisories = self.all.clone();
        advisories[pos] = advisory;
        self.set(advisories);
        Ok(())
    }

    fn remove_advisory(&mut self, id: &str) -> Result<(), StoreError> {
        let Some(pos) = self.position(id) else {
            warn!(%id, "removal of unknown advisory");
            return Err(store_error(
                StoreErrorKind::UnknownId,
                "Advisory with this ID does not exist",
                id,
            ));
        };
        let mut advisories = self.all.clone();
        advisories.remove(pos);
        self.set(advisories);
        Ok(())
    }
}

fn store_error(kind: StoreErrorKind, message: &str, id: &str) -> StoreError {
    StoreError {
        kind,
        message: message.to_string(),
        advisory_id: Some(id.to_string()),
    }
}
