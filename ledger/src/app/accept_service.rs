//! Accept workflow
//!
//! Marking an answer accepted credits two users at once: the asker
//! (`answer.accept`, triggered by the answerer) and the answerer
//! (`answer.accepted`, triggered by the asker). A question has at most one
//! accepted answer; accepting another one first unaccepts the old one.

use std::sync::Arc;

use serde::Serialize;

use crate::app::activity_ledger::{ActivityLedger, AwardRequest};
use crate::app::activity_type_resolver::ActivityTypeResolver;
use crate::app::transaction::{dispatch, finish, lock_participants};
use crate::domain::entities::{
    AnswerInfo, ObjectId, ObjectType, QuestionInfo, ReputationEvent, ReputationEventKind,
    ResolvedActivity, UserId,
};
use crate::domain::ports::{
    ConfigProvider, ContentRepository, LedgerStore, NotificationDispatcher, ObjectClassifier,
};
use crate::error::DomainError;

const ACCEPT_ACTION: &str = "accept";
const ACCEPTED_ACTION: &str = "accepted";

/// Rank effects of an accept or unaccept
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptResult {
    pub question_id: ObjectId,
    pub answer_id: ObjectId,
    /// Answer that lost its accepted status, if any
    pub replaced_answer_id: Option<ObjectId>,
    pub asker_delta: i32,
    pub answerer_delta: i32,
}

/// Rank reverted from one accept/accepted pair
#[derive(Debug, Clone, Copy, Default)]
struct RevokedPair {
    asker: i32,
    answerer: i32,
    was_active: bool,
}

pub struct AcceptService<S, C, K, N>
where
    S: LedgerStore,
    C: ConfigProvider,
    K: ObjectClassifier,
    N: NotificationDispatcher,
{
    store: Arc<S>,
    resolver: ActivityTypeResolver<C, K>,
    ledger: ActivityLedger<C>,
    notifier: Arc<N>,
}

impl<S, C, K, N> AcceptService<S, C, K, N>
where
    S: LedgerStore,
    C: ConfigProvider,
    K: ObjectClassifier,
    N: NotificationDispatcher,
{
    pub fn new(store: Arc<S>, config: Arc<C>, classifier: Arc<K>, notifier: Arc<N>) -> Self {
        Self {
            store,
            resolver: ActivityTypeResolver::new(config.clone(), classifier),
            ledger: ActivityLedger::new(config),
            notifier,
        }
    }

    /// Accept `answer_id` as the solution to `question_id`
    pub async fn accept(
        &self,
        answer_id: &ObjectId,
        question_id: &ObjectId,
        asker_id: &UserId,
        answerer_id: &UserId,
    ) -> Result<AcceptResult, DomainError> {
        self.expect_type(answer_id, ObjectType::Answer)?;
        self.expect_type(question_id, ObjectType::Question)?;

        let mut tx = self.store.begin().await?;
        let result = self
            .accept_in_tx(&mut tx, answer_id, question_id, asker_id, answerer_id)
            .await;
        let (outcome, events) = finish(tx, result).await?;

        tracing::info!(
            question_id = %question_id,
            answer_id = %answer_id,
            asker_delta = outcome.asker_delta,
            answerer_delta = outcome.answerer_delta,
            replaced = ?outcome.replaced_answer_id,
            "Answer accepted"
        );
        dispatch(self.notifier.as_ref(), events);
        Ok(outcome)
    }

    /// Withdraw the accepted status of `answer_id`
    pub async fn cancel_accept(
        &self,
        answer_id: &ObjectId,
        question_id: &ObjectId,
        asker_id: &UserId,
        answerer_id: &UserId,
    ) -> Result<AcceptResult, DomainError> {
        self.expect_type(answer_id, ObjectType::Answer)?;
        self.expect_type(question_id, ObjectType::Question)?;

        let mut tx = self.store.begin().await?;
        let result = self
            .cancel_in_tx(&mut tx, answer_id, question_id, asker_id, answerer_id)
            .await;
        let (outcome, events) = finish(tx, result).await?;

        tracing::info!(
            question_id = %question_id,
            answer_id = %answer_id,
            asker_delta = outcome.asker_delta,
            answerer_delta = outcome.answerer_delta,
            "Answer acceptance cancelled"
        );
        dispatch(self.notifier.as_ref(), events);
        Ok(outcome)
    }

    fn expect_type(&self, object_id: &ObjectId, expected: ObjectType) -> Result<(), DomainError> {
        let actual = self.resolver.classify(object_id)?;
        if actual != expected {
            return Err(DomainError::Validation(format!(
                "{} is a {}, expected a {}",
                object_id, actual, expected
            )));
        }
        Ok(())
    }

    fn accept_types(&self) -> Result<(ResolvedActivity, ResolvedActivity), DomainError> {
        let accept = self
            .resolver
            .resolve_for_type(ObjectType::Answer, ACCEPT_ACTION)?;
        let accepted = self
            .resolver
            .resolve_for_type(ObjectType::Answer, ACCEPTED_ACTION)?;
        Ok((accept, accepted))
    }

    /// Lock the question, load the answer and check both belong together
    /// and to the users named by the caller
    async fn load_pair(
        &self,
        tx: &mut S::Tx,
        answer_id: &ObjectId,
        question_id: &ObjectId,
        asker_id: &UserId,
        answerer_id: &UserId,
    ) -> Result<(QuestionInfo, AnswerInfo), DomainError> {
        let question = tx.lock_question(question_id).await?;
        let answer = tx
            .find_answer(answer_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Answer {}", answer_id)))?;

        if answer.question_id != question.id {
            return Err(DomainError::Validation(format!(
                "Answer {} does not belong to question {}",
                answer_id, question_id
            )));
        }
        if &question.user_id != asker_id {
            return Err(DomainError::Validation(format!(
                "Question {} is not owned by user {}",
                question_id, asker_id
            )));
        }
        if &answer.user_id != answerer_id {
            return Err(DomainError::Validation(format!(
                "Answer {} is not owned by user {}",
                answer_id, answerer_id
            )));
        }
        Ok((question, answer))
    }

    async fn accept_in_tx(
        &self,
        tx: &mut S::Tx,
        answer_id: &ObjectId,
        question_id: &ObjectId,
        asker_id: &UserId,
        answerer_id: &UserId,
    ) -> Result<(AcceptResult, Vec<ReputationEvent>), DomainError> {
        let (question, _) = self
            .load_pair(tx, answer_id, question_id, asker_id, answerer_id)
            .await?;

        let replaced = match question.accepted_answer_id {
            Some(ref previous) if previous != answer_id => tx.find_answer(previous).await?,
            _ => None,
        };

        let mut participants = vec![asker_id, answerer_id];
        if let Some(ref previous) = replaced {
            participants.push(&previous.user_id);
        }
        lock_participants(tx, &participants).await?;

        let mut events = Vec::new();
        let (accept, accepted) = self.accept_types()?;

        if let Some(ref previous) = replaced {
            let revoked = self
                .revoke_pair(tx, &previous.id, asker_id, &previous.user_id)
                .await?;
            tx.set_answer_adopted(&previous.id, false).await?;
            if revoked.was_active {
                events.push(ReputationEvent {
                    kind: ReputationEventKind::AcceptCancelled,
                    user_id: previous.user_id.clone(),
                    trigger_user_id: Some(asker_id.clone()),
                    object_id: previous.id.clone(),
                    rank_delta: revoked.answerer,
                });
            }
            tracing::debug!(
                question_id = %question_id,
                previous_answer_id = %previous.id,
                "Previously accepted answer unaccepted"
            );
        }

        let asker_outcome = self
            .ledger
            .award(
                tx,
                AwardRequest {
                    user_id: asker_id.clone(),
                    trigger_user_id: Some(answerer_id.clone()),
                    object_id: answer_id.clone(),
                    original_object_id: question_id.clone(),
                    resolved: accept,
                },
            )
            .await?;
        let answerer_outcome = self
            .ledger
            .award(
                tx,
                AwardRequest {
                    user_id: answerer_id.clone(),
                    trigger_user_id: Some(asker_id.clone()),
                    object_id: answer_id.clone(),
                    original_object_id: question_id.clone(),
                    resolved: accepted,
                },
            )
            .await?;

        tx.set_answer_adopted(answer_id, true).await?;
        tx.set_accepted_answer(question_id, Some(answer_id)).await?;

        if answerer_outcome.newly_active() {
            let trigger = (asker_id != answerer_id).then(|| asker_id.clone());
            events.push(ReputationEvent {
                kind: ReputationEventKind::AnswerAccepted,
                user_id: answerer_id.clone(),
                trigger_user_id: trigger,
                object_id: answer_id.clone(),
                rank_delta: answerer_outcome.rank_delta(),
            });
        }

        let result = AcceptResult {
            question_id: question_id.clone(),
            answer_id: answer_id.clone(),
            replaced_answer_id: replaced.map(|previous| previous.id),
            asker_delta: asker_outcome.rank_delta(),
            answerer_delta: answerer_outcome.rank_delta(),
        };
        Ok((result, events))
    }

    async fn cancel_in_tx(
        &self,
        tx: &mut S::Tx,
        answer_id: &ObjectId,
        question_id: &ObjectId,
        asker_id: &UserId,
        answerer_id: &UserId,
    ) -> Result<(AcceptResult, Vec<ReputationEvent>), DomainError> {
        let (question, _) = self
            .load_pair(tx, answer_id, question_id, asker_id, answerer_id)
            .await?;
        lock_participants(tx, &[asker_id, answerer_id]).await?;

        let revoked = self
            .revoke_pair(tx, answer_id, asker_id, answerer_id)
            .await?;
        tx.set_answer_adopted(answer_id, false).await?;
        if question.accepted_answer_id.as_ref() == Some(answer_id) {
            tx.set_accepted_answer(question_id, None).await?;
        }

        let mut events = Vec::new();
        if revoked.was_active {
            let trigger = (asker_id != answerer_id).then(|| asker_id.clone());
            events.push(ReputationEvent {
                kind: ReputationEventKind::AcceptCancelled,
                user_id: answerer_id.clone(),
                trigger_user_id: trigger,
                object_id: answer_id.clone(),
                rank_delta: revoked.answerer,
            });
        }

        let result = AcceptResult {
            question_id: question_id.clone(),
            answer_id: answer_id.clone(),
            replaced_answer_id: None,
            asker_delta: revoked.asker,
            answerer_delta: revoked.answerer,
        };
        Ok((result, events))
    }

    async fn revoke_pair(
        &self,
        tx: &mut S::Tx,
        answer_id: &ObjectId,
        asker_id: &UserId,
        answerer_id: &UserId,
    ) -> Result<RevokedPair, DomainError> {
        let (accept, accepted) = self.accept_types()?;
        let mut revoked = RevokedPair::default();

        if let Some(activity) = self
            .ledger
            .find_active(tx, answer_id, asker_id, Some(answerer_id), accept.activity_type)
            .await?
        {
            revoked.asker = self.ledger.revoke(tx, &activity).await?.applied();
            revoked.was_active = true;
        }

        if let Some(activity) = self
            .ledger
            .find_active(tx, answer_id, answerer_id, Some(asker_id), accepted.activity_type)
            .await?
        {
            revoked.answerer = self.ledger.revoke(tx, &activity).await?.applied();
            revoked.was_active = true;
        }

        Ok(revoked)
    }
}
