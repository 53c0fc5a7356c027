//! The event boundary: roster and advisory-set updates in, notices out.
//!
//! The collaborator forwards each event it receives to [`Session::apply`];
//! the session never subscribes to anything itself.

use crate::error::{ParseError, ParseErrorKind, SerializeError};
use crate::evaluate::{active_advisories, build_notice};
use crate::parse::{advisories_from_value, parse_advisories};
use crate::settings::Preferences;
use crate::store::{ADVISORIES_CONFIG_KEY, AdvisoryStore};
use crate::types::{Advisory, Notice, UserAttributes};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub const JOIN_EVENT: &str = "vrcmrd:join";
pub const UPDATE_USER_EVENT: &str = "vrcmrd:update-user";
pub const LEAVE_EVENT: &str = "vrcmrd:leave";
pub const ADVISORIES_UPDATED_EVENT: &str = "vrcmrd:advisories_updated";
pub const CONFIG_UPDATED_EVENT: &str = "vrcmrd:config_updated";
/// Emitted by the collaborator for each published notice.
pub const NOTICE_EVENT: &str = "vrcmrd:notice";

// ─── Event ──────────────────────────────────────────────────────────────────

/// One update from the collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    UserJoined(UserAttributes),
    UserUpdated(UserAttributes),
    UserLeft { id: String },
    AdvisoriesChanged(Vec<Advisory>),
    ConfigUpdated { key: String, value: String },
}

#[derive(Deserialize)]
struct UserRef {
    id: String,
}

#[derive(Deserialize)]
struct ConfigUpdate {
    key: String,
    value: String,
}

impl Event {
    /// The wire name the event is delivered under.
    pub fn name(&self) -> &'static str {
        match self {
            Event::UserJoined(_) => JOIN_EVENT,
            Event::UserUpdated(_) => UPDATE_USER_EVENT,
            Event::UserLeft { .. } => LEAVE_EVENT,
            Event::AdvisoriesChanged(_) => ADVISORIES_UPDATED_EVENT,
            Event::ConfigUpdated { .. } => CONFIG_UPDATED_EVENT,
        }
    }

    /// Decodes a named event and its JSON payload.
    pub fn from_wire(name: &str, payload: Value) -> Result<Event, ParseError> {
        let event = match name {
            JOIN_EVENT => Event::UserJoined(payload_as(name, payload)?),
            UPDATE_USER_EVENT => Event::UserUpdated(payload_as(name, payload)?),
            LEAVE_EVENT => {
                let user: UserRef = payload_as(name, payload)?;
                Event::UserLeft { id: user.id }
            }
            ADVISORIES_UPDATED_EVENT => {
                let advisories = advisories_from_value(payload).map_err(|mut e| {
                    e.message = format!("bad {} payload: {}", name, e.message);
                    e
                })?;
                Event::AdvisoriesChanged(advisories)
            }
            CONFIG_UPDATED_EVENT => {
                let update: ConfigUpdate = payload_as(name, payload)?;
                Event::ConfigUpdated {
                    key: update.key,
                    value: update.value,
                }
            }
            other => {
                return Err(ParseError {
                    kind: ParseErrorKind::UnknownVariant,
                    message: format!("unknown event '{}'", other),
                    path: None,
                    line: None,
                    column: None,
                });
            }
        };
        Ok(event)
    }

    /// The JSON payload this event is delivered with.
    pub fn to_payload(&self) -> Result<Value, SerializeError> {
        let value = match self {
            Event::UserJoined(user) | Event::UserUpdated(user) => serde_json::to_value(user),
            Event::UserLeft { id } => Ok(json!({ "id": id })),
            Event::AdvisoriesChanged(advisories) => serde_json::to_value(advisories),
            Event::ConfigUpdated { key, value } => Ok(json!({ "key": key, "value": value })),
        };
        value.map_err(|e| SerializeError {
            message: format!("failed to encode {} payload: {}", self.name(), e),
        })
    }
}

fn payload_as<T: serde::de::DeserializeOwned>(name: &str, payload: Value) -> Result<T, ParseError> {
    serde_json::from_value(payload).map_err(|e| ParseError {
        kind: ParseErrorKind::TypeMismatch,
        message: format!("bad {} payload: {}", name, e),
        path: Some(name.to_string()),
        line: None,
        column: None,
    })
}

// ─── Session ────────────────────────────────────────────────────────────────

/// A user present in the instance and the advisories currently applying to them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterEntry {
    pub user: UserAttributes,
    /// Ids of applying advisories, most severe first.
    pub advisories: Vec<String>,
}

/// Live roster plus advisory set.
#[derive(Clone, Debug, Default)]
pub struct Session {
    store: AdvisoryStore,
    preferences: Preferences,
    roster: Vec<RosterEntry>,
}

impl Session {
    pub fn new(store: AdvisoryStore, preferences: Preferences) -> Self {
        Session {
            store,
            preferences,
            roster: Vec::new(),
        }
    }

    pub fn store(&self) -> &AdvisoryStore {
        &self.store
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Users in join order.
    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    pub fn user(&self, id: &str) -> Option<&RosterEntry> {
        self.roster.iter().find(|e| e.user.id == id)
    }

    /// Notice history, oldest first.
    pub fn notices(&self) -> &[Notice] {
        self.store.notices()
    }

    /// Applies one event and returns the notices it raised.
    ///
    /// A notice is raised when an advisory starts applying to a user; an
    /// advisory that already applied raises nothing on later updates.
    pub fn apply(&mut self, event: Event) -> Vec<Notice> {
        debug!(event = event.name(), "applying event");
        let notices = match event {
            Event::UserJoined(user) => {
                self.roster.retain(|e| e.user.id != user.id);
                self.roster.push(RosterEntry {
                    user,
                    advisories: Vec::new(),
                });
                let last = self.roster.len() - 1;
                self.refresh(last)
            }
            Event::UserUpdated(user) => match self.position(&user.id) {
                Some(i) => {
                    self.roster[i].user = user;
                    self.refresh(i)
                }
                None => return self.apply(Event::UserJoined(user)),
            },
            Event::UserLeft { id } => {
                self.roster.retain(|e| e.user.id != id);
                Vec::new()
            }
            Event::AdvisoriesChanged(advisories) => {
                self.store.set(advisories);
                self.refresh_all()
            }
            Event::ConfigUpdated { key, value } => self.apply_config(&key, &value),
        };
        for notice in &notices {
            self.store.push_notice(notice.clone());
        }
        notices
    }

    fn apply_config(&mut self, key: &str, value: &str) -> Vec<Notice> {
        if key == ADVISORIES_CONFIG_KEY {
            return match parse_advisories(value) {
                Ok(advisories) => {
                    self.store.set(advisories);
                    self.refresh_all()
                }
                Err(e) => {
                    warn!(error = %e, "ignoring unreadable advisory list");
                    Vec::new()
                }
            };
        }
        if let Err(e) = self.preferences.apply(key, value) {
            warn!(error = %e, "ignoring config update");
        }
        Vec::new()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.roster.iter().position(|e| e.user.id == id)
    }

    fn refresh_all(&mut self) -> Vec<Notice> {
        (0..self.roster.len()).flat_map(|i| self.refresh(i)).collect()
    }

    /// Re-evaluates one roster entry and returns notices for newly applying
    /// advisories.
    fn refresh(&mut self, index: usize) -> Vec<Notice> {
        let options = &self.preferences.matching;
        let entry = &self.roster[index];
        let previous: HashSet<&str> = entry.advisories.iter().map(String::as_str).collect();
        let hits = active_advisories(self.store.active(), &entry.user, options);

        let notices: Vec<Notice> = hits
            .iter()
            .filter(|a| !previous.contains(a.id.as_str()))
            .map(|a| build_notice(a, &entry.user, options))
            .collect();
        let ids: Vec<String> = hits.iter().map(|a| a.id.clone()).collect();

        if !notices.is_empty() {
            info!(user = %entry.user.id, raised = notices.len(), "advisories now apply");
        }
        self.roster[index].advisories = ids;
        notices
    }
}
