//! Interest operations
//!
//! Denials are presented two ways. When no grant for the action survives in
//! the compiled ability the action is categorically unavailable and the
//! caller sees `forbidden`. When grants exist but the target record falls
//! outside them the caller sees `not found`, so the record's existence is
//! not revealed.

use crate::ability::{
    Ability, AbilityCompiler, Action, Condition, Filter, Record, ResourceType, Session,
    TransitionGuard,
};
use crate::error::{PermissionDenied, Result, ValidationError};
use crate::events::{EventBus, Topic};
use crate::model::{Interest, InterestStatus, InterestUpdate, Message, NewInterest, UpdateKind};
use crate::store::InterestStore;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, instrument};

const SUBJECT: ResourceType = ResourceType::Interest;
const STATUS_FIELD: &str = "status";

/// Optional narrowing for [`InterestService::list`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListQuery {
    /// Only interests in this opportunity
    #[serde(default, rename = "op")]
    pub opportunity: Option<String>,
    /// Only interests of this person
    #[serde(default, rename = "me")]
    pub person: Option<String>,
}

impl ListQuery {
    pub fn for_opportunity(opportunity: impl Into<String>) -> Self {
        Self {
            opportunity: Some(opportunity.into()),
            ..Default::default()
        }
    }

    pub fn for_person(person: impl Into<String>) -> Self {
        Self {
            person: Some(person.into()),
            ..Default::default()
        }
    }

    fn to_filter(&self) -> Filter {
        let mut condition = Condition::new();
        if let Some(opportunity) = &self.opportunity {
            condition = condition.eq("opportunity", opportunity.as_str());
        }
        if let Some(person) = &self.person {
            condition = condition.eq("person", person.as_str());
        }
        Filter::from_condition(&condition)
    }
}

/// Interest controller
pub struct InterestService {
    compiler: Arc<AbilityCompiler>,
    store: Arc<dyn InterestStore>,
    guard: TransitionGuard,
    events: EventBus,
}

impl InterestService {
    pub fn new(
        compiler: Arc<AbilityCompiler>,
        store: Arc<dyn InterestStore>,
        guard: TransitionGuard,
        events: EventBus,
    ) -> Self {
        Self {
            compiler,
            store,
            guard,
            events,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Interests visible to the session, oldest first
    #[instrument(skip(self, session), fields(identity = ?session.identity()))]
    pub async fn list(&self, session: &Session, query: &ListQuery) -> Result<Vec<Interest>> {
        let ability = self.ability(session).await?;
        require_grant(&ability, Action::List)?;

        let filter = ability.filter_for(Action::List).and(query.to_filter());
        let interests = self.store.query(&filter).await?;

        debug!(count = interests.len(), "Listed interests");
        Ok(interests)
    }

    #[instrument(skip(self, session), fields(identity = ?session.identity()))]
    pub async fn get(&self, session: &Session, id: &str) -> Result<Interest> {
        let ability = self.ability(session).await?;
        self.find_visible(&ability, Action::Read, id).await
    }

    /// Create an interest. `person` defaults to the session identity and
    /// `status` to `interested`.
    #[instrument(skip(self, session, data), fields(identity = ?session.identity()))]
    pub async fn create(&self, session: &Session, data: NewInterest) -> Result<Interest> {
        let ability = self.ability(session).await?;
        require_grant(&ability, Action::Create)?;

        let person = data
            .person
            .or_else(|| session.identity().map(str::to_string));
        let status = data
            .status
            .unwrap_or_else(|| InterestStatus::Interested.as_str().to_string());

        // Permission first, field validation after
        let requested = Record::new(SUBJECT)
            .with("person", person.clone().map_or(Value::Null, Value::from))
            .with("opportunity", data.opportunity.clone().map_or(Value::Null, Value::from))
            .with("status", status.as_str());
        if !ability.can(Action::Create, &requested) {
            debug!(person = ?person, "Create denied");
            return Err(PermissionDenied::forbidden(Action::Create, SUBJECT).into());
        }

        let person = person.ok_or_else(|| ValidationError::MissingField("person".into()))?;
        let opportunity = data
            .opportunity
            .ok_or_else(|| ValidationError::MissingField("opportunity".into()))?;
        let status = InterestStatus::parse_requested(&status)?;
        validate_messages(&data.messages)?;

        let interest = Interest {
            id: String::new(),
            person,
            opportunity,
            status,
            messages: data.messages,
            date_added: now_millis(),
        };

        let saved = self.store.save(interest).await?;
        self.events
            .publish(Topic::InterestUpdate, detail(&saved, UpdateKind::Accept));

        info!(id = %saved.id, "Created interest");
        Ok(saved)
    }

    /// Apply a status change and/or append messages
    #[instrument(skip(self, session, update), fields(identity = ?session.identity()))]
    pub async fn update(
        &self,
        session: &Session,
        id: &str,
        update: InterestUpdate,
    ) -> Result<Interest> {
        let ability = self.ability(session).await?;
        let mut interest = self.find_visible(&ability, Action::Read, id).await?;

        let requested = update
            .status
            .as_deref()
            .map(InterestStatus::parse_requested)
            .transpose()?;
        validate_messages(&update.messages)?;

        if let Some(to) = requested {
            self.check_transition(session, &interest, to)?;
            interest.status = to;
        }
        interest.messages.extend(update.messages);

        if !ability.can(Action::Update, &interest) {
            return Err(PermissionDenied::forbidden_because(
                Action::Update,
                SUBJECT,
                "invalid update attempted",
            )
            .into());
        }

        let saved = self.store.save(interest).await?;
        let topic = match update.kind {
            UpdateKind::Message => Topic::InterestMessage,
            _ => Topic::InterestUpdate,
        };
        self.events.publish(topic, detail(&saved, update.kind));

        info!(id = %saved.id, status = %saved.status, "Updated interest");
        Ok(saved)
    }

    #[instrument(skip(self, session), fields(identity = ?session.identity()))]
    pub async fn delete(&self, session: &Session, id: &str) -> Result<()> {
        let ability = self.ability(session).await?;
        require_grant(&ability, Action::Delete)?;

        let filter = ability.filter_for(Action::Delete).and(Filter::by_id(id));
        if self.store.delete_one(&filter).await? == 0 {
            return Err(PermissionDenied::not_found(Action::Delete, SUBJECT).into());
        }

        self.events.publish(Topic::InterestDelete, json!({ "_id": id }));
        info!(id, "Deleted interest");
        Ok(())
    }

    async fn ability(&self, session: &Session) -> Result<Ability> {
        Ok(self.compiler.compile(session, SUBJECT).await?)
    }

    async fn find_visible(&self, ability: &Ability, action: Action, id: &str) -> Result<Interest> {
        require_grant(ability, action)?;

        let filter = ability.filter_for(action).and(Filter::by_id(id));
        self.store
            .find_one(&filter)
            .await?
            .ok_or_else(|| PermissionDenied::not_found(action, SUBJECT).into())
    }

    /// The guard governs one role acting on its own records, and only when
    /// its table is keyed on `status`, the one field an update can change
    fn check_transition(
        &self,
        session: &Session,
        interest: &Interest,
        to: InterestStatus,
    ) -> Result<()> {
        let Some(table) = self.guard.table(SUBJECT) else {
            return Ok(());
        };
        if table.field() != STATUS_FIELD {
            return Ok(());
        }
        let own = session.identity() == Some(interest.person.as_str());

        if session.holds(table.actor()) && own {
            self.guard.check(
                SUBJECT,
                interest.status.as_str(),
                to.as_str(),
                table.actor(),
            )?;
        }
        Ok(())
    }
}

fn require_grant(ability: &Ability, action: Action) -> Result<()> {
    if ability.has_grant(action) {
        Ok(())
    } else {
        Err(PermissionDenied::forbidden(action, SUBJECT).into())
    }
}

fn validate_messages(messages: &[Message]) -> std::result::Result<(), ValidationError> {
    if messages.iter().any(|m| m.body.trim().is_empty()) {
        return Err(ValidationError::EmptyMessage);
    }
    Ok(())
}

/// Event payload: the stored record tagged with the update kind
fn detail(interest: &Interest, kind: UpdateKind) -> Value {
    let mut payload = serde_json::to_value(interest).unwrap_or(Value::Null);
    if let (Value::Object(map), Ok(kind)) = (&mut payload, serde_json::to_value(kind)) {
        map.insert("type".to_string(), kind);
    }
    payload
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_filter() {
        assert!(ListQuery::default().to_filter().is_everything());

        let query = ListQuery {
            opportunity: Some("o1".into()),
            person: Some("p2".into()),
        };
        assert_eq!(
            query.to_filter().to_query(),
            json!({"opportunity": "o1", "person": "p2"})
        );
    }

    #[test]
    fn test_list_query_from_request_params() {
        let query: ListQuery = serde_json::from_value(json!({"op": "o1"})).unwrap();
        assert_eq!(query, ListQuery::for_opportunity("o1"));
    }

    #[test]
    fn test_empty_message_rejected() {
        assert_eq!(
            validate_messages(&[Message::new("  ", "p1")]),
            Err(ValidationError::EmptyMessage)
        );
        assert!(validate_messages(&[Message::new("hello", "p1")]).is_ok());
    }

    #[test]
    fn test_detail_carries_type() {
        let interest = Interest {
            id: "i0".into(),
            person: "p2".into(),
            opportunity: "o0".into(),
            status: InterestStatus::Invited,
            messages: vec![],
            date_added: 0,
        };
        let payload = detail(&interest, UpdateKind::Message);
        assert_eq!(payload["type"], "message");
        assert_eq!(payload["_id"], "i0");
    }
}
