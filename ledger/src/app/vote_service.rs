//! Vote workflow
//!
//! Up and down votes on questions, answers and comments. Each vote records a
//! marker for the voter (`vote_up`/`vote_down`) and a credit for the object
//! owner (`voted_up`/`voted_down`). The two directions are mutually
//! exclusive: a vote first revokes the voter's opposite-direction pair.

use std::sync::Arc;

use crate::app::activity_ledger::{ActivityLedger, AwardRequest};
use crate::app::activity_type_resolver::ActivityTypeResolver;
use crate::app::transaction::{dispatch, finish, lock_participants};
use crate::domain::entities::{
    ObjectId, ReputationEvent, ReputationEventKind, UserId, VoteDirection, VoteTally, VoteTarget,
};
use crate::domain::ports::{
    ActivityRepository, ConfigProvider, ContentRepository, LedgerStore, LedgerTransaction,
    NotificationDispatcher, ObjectClassifier,
};
use crate::error::DomainError;

pub struct VoteService<S, C, K, N>
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

impl<S, C, K, N> VoteService<S, C, K, N>
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

    /// Cast a vote. Repeating an active vote changes nothing.
    pub async fn vote(
        &self,
        object_id: &ObjectId,
        voter_id: &UserId,
        owner_id: &UserId,
        direction: VoteDirection,
    ) -> Result<VoteTally, DomainError> {
        let target = self.vote_target(object_id, voter_id, owner_id, direction)?;

        let mut tx = self.store.begin().await?;
        let result = self
            .vote_in_tx(&mut tx, &target, voter_id, owner_id, direction)
            .await;
        let (tally, events) = finish(tx, result).await?;

        tracing::info!(
            object_id = %object_id,
            voter_id = %voter_id,
            direction = %direction,
            vote_count = tally.vote_count,
            "Vote recorded"
        );
        dispatch(self.notifier.as_ref(), events);
        Ok(tally)
    }

    /// Withdraw a vote. Withdrawing a vote that is not active changes nothing.
    pub async fn cancel_vote(
        &self,
        object_id: &ObjectId,
        voter_id: &UserId,
        owner_id: &UserId,
        direction: VoteDirection,
    ) -> Result<VoteTally, DomainError> {
        let target = self.vote_target(object_id, voter_id, owner_id, direction)?;

        let mut tx = self.store.begin().await?;
        let result = self
            .cancel_in_tx(&mut tx, &target, voter_id, owner_id, direction)
            .await;
        let (tally, events) = finish(tx, result).await?;

        tracing::info!(
            object_id = %object_id,
            voter_id = %voter_id,
            direction = %direction,
            vote_count = tally.vote_count,
            "Vote cancelled"
        );
        dispatch(self.notifier.as_ref(), events);
        Ok(tally)
    }

    /// Vote state of an object as seen by `voter_id`
    pub async fn tally(
        &self,
        object_id: &ObjectId,
        voter_id: &UserId,
    ) -> Result<VoteTally, DomainError> {
        let object_type = self.resolver.classify(object_id)?;
        let target = VoteTarget::new(object_id.clone(), object_type)?;

        let mut tx = self.store.begin().await?;
        let result = self.tally_in_tx(&mut tx, &target, voter_id).await;
        finish(tx, result).await
    }

    fn vote_target(
        &self,
        object_id: &ObjectId,
        voter_id: &UserId,
        owner_id: &UserId,
        direction: VoteDirection,
    ) -> Result<VoteTarget, DomainError> {
        let object_type = self.resolver.classify(object_id)?;
        let target = VoteTarget::new(object_id.clone(), object_type)?;

        if !target.supports(direction) {
            return Err(DomainError::Validation(format!(
                "{} objects cannot be voted {}",
                object_type, direction
            )));
        }
        if voter_id == owner_id {
            return Err(DomainError::Validation(
                "Users cannot vote on their own content".to_string(),
            ));
        }
        Ok(target)
    }

    async fn vote_in_tx(
        &self,
        tx: &mut S::Tx,
        target: &VoteTarget,
        voter_id: &UserId,
        owner_id: &UserId,
        direction: VoteDirection,
    ) -> Result<(VoteTally, Vec<ReputationEvent>), DomainError> {
        lock_rows(tx, target, voter_id, owner_id).await?;
        let mut events = Vec::new();

        let opposite = direction.opposite();
        if target.supports(opposite) {
            if let Some(reverted) = self
                .revoke_pair(tx, target, voter_id, owner_id, opposite)
                .await?
            {
                events.push(ReputationEvent {
                    kind: ReputationEventKind::VoteCancelled(opposite),
                    user_id: owner_id.clone(),
                    trigger_user_id: Some(voter_id.clone()),
                    object_id: target.object_id().clone(),
                    rank_delta: reverted,
                });
            }
        }

        let object_type = target.object_type();
        let marker = self
            .resolver
            .resolve_for_type(object_type, direction.voter_action())?;
        let credit = self
            .resolver
            .resolve_for_type(object_type, direction.owner_action())?;
        let original_object_id = self.original_object_id(tx, target).await?;

        self.ledger
            .award(
                tx,
                AwardRequest {
                    user_id: voter_id.clone(),
                    trigger_user_id: None,
                    object_id: target.object_id().clone(),
                    original_object_id: original_object_id.clone(),
                    resolved: marker,
                },
            )
            .await?;

        let outcome = self
            .ledger
            .award(
                tx,
                AwardRequest {
                    user_id: owner_id.clone(),
                    trigger_user_id: Some(voter_id.clone()),
                    object_id: target.object_id().clone(),
                    original_object_id,
                    resolved: credit,
                },
            )
            .await?;

        if outcome.newly_active() {
            tx.adjust_vote_count(target, direction.sign()).await?;
            events.push(ReputationEvent {
                kind: ReputationEventKind::Voted(direction),
                user_id: owner_id.clone(),
                trigger_user_id: Some(voter_id.clone()),
                object_id: target.object_id().clone(),
                rank_delta: outcome.rank_delta(),
            });
        } else {
            tracing::debug!(
                object_id = %target.object_id(),
                voter_id = %voter_id,
                direction = %direction,
                "Vote already active"
            );
        }

        let tally = self.tally_in_tx(tx, target, voter_id).await?;
        Ok((tally, events))
    }

    async fn cancel_in_tx(
        &self,
        tx: &mut S::Tx,
        target: &VoteTarget,
        voter_id: &UserId,
        owner_id: &UserId,
        direction: VoteDirection,
    ) -> Result<(VoteTally, Vec<ReputationEvent>), DomainError> {
        lock_rows(tx, target, voter_id, owner_id).await?;

        let events = self
            .revoke_pair(tx, target, voter_id, owner_id, direction)
            .await?
            .map(|reverted| ReputationEvent {
                kind: ReputationEventKind::VoteCancelled(direction),
                user_id: owner_id.clone(),
                trigger_user_id: Some(voter_id.clone()),
                object_id: target.object_id().clone(),
                rank_delta: reverted,
            })
            .into_iter()
            .collect();

        let tally = self.tally_in_tx(tx, target, voter_id).await?;
        Ok((tally, events))
    }

    /// Revoke the voter's marker and the owner's credit for one direction.
    /// Returns the owner's reverted rank when the credit was active.
    async fn revoke_pair(
        &self,
        tx: &mut S::Tx,
        target: &VoteTarget,
        voter_id: &UserId,
        owner_id: &UserId,
        direction: VoteDirection,
    ) -> Result<Option<i32>, DomainError> {
        let object_type = target.object_type();
        let object_id = target.object_id();
        let marker = self
            .resolver
            .resolve_for_type(object_type, direction.voter_action())?;
        let credit = self
            .resolver
            .resolve_for_type(object_type, direction.owner_action())?;

        if let Some(activity) = self
            .ledger
            .find_active(tx, object_id, voter_id, None, marker.activity_type)
            .await?
        {
            self.ledger.revoke(tx, &activity).await?;
        }

        let Some(activity) = self
            .ledger
            .find_active(tx, object_id, owner_id, Some(voter_id), credit.activity_type)
            .await?
        else {
            return Ok(None);
        };

        let change = self.ledger.revoke(tx, &activity).await?;
        tx.adjust_vote_count(target, -direction.sign()).await?;
        Ok(Some(change.applied()))
    }

    async fn tally_in_tx(
        &self,
        tx: &mut S::Tx,
        target: &VoteTarget,
        voter_id: &UserId,
    ) -> Result<VoteTally, DomainError> {
        let object_id = target.object_id();
        let mut tally = VoteTally {
            object_id: object_id.clone(),
            up_votes: 0,
            down_votes: 0,
            vote_count: tx.find_vote_count(target).await?,
            status: None,
        };

        for direction in [VoteDirection::Up, VoteDirection::Down] {
            if !target.supports(direction) {
                continue;
            }
            let marker = self
                .resolver
                .resolve_for_type(target.object_type(), direction.voter_action())?;
            let count = tx.count_active(object_id, marker.activity_type).await?;
            match direction {
                VoteDirection::Up => tally.up_votes = count,
                VoteDirection::Down => tally.down_votes = count,
            }

            if self
                .ledger
                .find_active(tx, object_id, voter_id, None, marker.activity_type)
                .await?
                .is_some()
            {
                tally.status = Some(direction);
            }
        }

        Ok(tally)
    }

    /// Answers roll up to their question; everything else is its own root
    async fn original_object_id(
        &self,
        tx: &mut S::Tx,
        target: &VoteTarget,
    ) -> Result<ObjectId, DomainError> {
        match target {
            VoteTarget::Answer(answer_id) => {
                let answer = tx
                    .find_answer(answer_id)
                    .await?
                    .ok_or_else(|| DomainError::NotFound(format!("Answer {}", answer_id)))?;
                Ok(answer.question_id)
            }
            VoteTarget::Question(id) | VoteTarget::Comment(id) => Ok(id.clone()),
        }
    }
}

/// Question row first, then users in id order, matching the accept workflow
async fn lock_rows<T>(
    tx: &mut T,
    target: &VoteTarget,
    voter_id: &UserId,
    owner_id: &UserId,
) -> Result<(), DomainError>
where
    T: LedgerTransaction,
{
    if let VoteTarget::Question(question_id) = target {
        tx.lock_question(question_id).await?;
    }
    lock_participants(tx, &[voter_id, owner_id]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::classifier::IdPrefixClassifier;
    use crate::app::rank_config::{
        RANK_ANSWER_VOTED_DOWN, RANK_ANSWER_VOTED_UP, RANK_ANSWER_VOTE_DOWN,
        RANK_QUESTION_VOTED_UP,
    };
    use crate::domain::entities::RANK_FLOOR;
    use crate::test_utils::fixtures::{
        answer_id, comment_id, qa_store, question_id, tag_id, test_config, user, TestConfig,
        ANSWERER, ASKER, VOTER,
    };
    use crate::test_utils::mocks::{InMemoryLedgerStore, RecordingNotificationDispatcher};

    type TestVoteService = VoteService<
        InMemoryLedgerStore,
        TestConfig,
        IdPrefixClassifier,
        RecordingNotificationDispatcher,
    >;

    fn service(
        store: &InMemoryLedgerStore,
    ) -> (TestVoteService, Arc<RecordingNotificationDispatcher>) {
        let notifier = Arc::new(RecordingNotificationDispatcher::new());
        let service = VoteService::new(
            Arc::new(store.clone()),
            test_config(),
            Arc::new(IdPrefixClassifier),
            notifier.clone(),
        );
        (service, notifier)
    }

    #[tokio::test]
    async fn up_vote_credits_owner_and_counts() {
        let store = qa_store();
        let (service, notifier) = service(&store);

        let tally = service
            .vote(&answer_id(1), &user(VOTER), &user(ANSWERER), VoteDirection::Up)
            .await
            .unwrap();

        assert_eq!(tally.vote_count, 1);
        assert_eq!(tally.up_votes, 1);
        assert_eq!(tally.status, Some(VoteDirection::Up));
        assert_eq!(
            store.user_rank(&user(ANSWERER)).await,
            Some(10 + RANK_ANSWER_VOTED_UP)
        );
        assert_eq!(store.user_rank(&user(VOTER)).await, Some(10));

        let events = notifier.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ReputationEventKind::Voted(VoteDirection::Up));
        assert_eq!(events[0].rank_delta, RANK_ANSWER_VOTED_UP);
    }

    #[tokio::test]
    async fn voting_up_twice_counts_once() {
        let store = qa_store();
        let (service, notifier) = service(&store);

        for _ in 0..2 {
            service
                .vote(&answer_id(1), &user(VOTER), &user(ANSWERER), VoteDirection::Up)
                .await
                .unwrap();
        }

        assert_eq!(store.vote_count(&answer_id(1)).await, Some(1));
        assert_eq!(
            store.user_rank(&user(ANSWERER)).await,
            Some(10 + RANK_ANSWER_VOTED_UP)
        );
        assert_eq!(store.active_activities(&answer_id(1)).await.len(), 2);
        assert_eq!(notifier.events().len(), 1);
    }

    #[tokio::test]
    async fn down_vote_replaces_up_vote() {
        let store = qa_store();
        let (service, _) = service(&store);

        service
            .vote(&answer_id(1), &user(VOTER), &user(ANSWERER), VoteDirection::Up)
            .await
            .unwrap();
        let tally = service
            .vote(&answer_id(1), &user(VOTER), &user(ANSWERER), VoteDirection::Down)
            .await
            .unwrap();

        assert_eq!(tally.vote_count, -1);
        assert_eq!(tally.up_votes, 0);
        assert_eq!(tally.down_votes, 1);
        assert_eq!(tally.status, Some(VoteDirection::Down));
        assert_eq!(
            store.user_rank(&user(ANSWERER)).await,
            Some(10 + RANK_ANSWER_VOTED_DOWN)
        );
        assert_eq!(
            store.user_rank(&user(VOTER)).await,
            Some(10 + RANK_ANSWER_VOTE_DOWN)
        );
    }

    #[tokio::test]
    async fn down_vote_clamps_owner_at_floor() {
        let store = qa_store().with_user("7", 2);
        let (service, _) = service(&store);

        service
            .vote(&answer_id(1), &user("7"), &user(ANSWERER), VoteDirection::Down)
            .await
            .unwrap();
        store.set_user_rank(&user(ANSWERER), 1).await;
        service
            .vote(&answer_id(1), &user(VOTER), &user(ANSWERER), VoteDirection::Down)
            .await
            .unwrap();

        assert_eq!(store.user_rank(&user(ANSWERER)).await, Some(RANK_FLOOR));
        assert_eq!(store.vote_count(&answer_id(1)).await, Some(-2));
    }

    #[tokio::test]
    async fn cancel_vote_restores_everything() {
        let store = qa_store();
        let (service, notifier) = service(&store);

        service
            .vote(&question_id(1), &user(VOTER), &user(ASKER), VoteDirection::Up)
            .await
            .unwrap();
        assert_eq!(
            store.user_rank(&user(ASKER)).await,
            Some(10 + RANK_QUESTION_VOTED_UP)
        );

        let tally = service
            .cancel_vote(&question_id(1), &user(VOTER), &user(ASKER), VoteDirection::Up)
            .await
            .unwrap();

        assert_eq!(tally.vote_count, 0);
        assert_eq!(tally.status, None);
        assert_eq!(store.user_rank(&user(ASKER)).await, Some(10));
        assert!(store.active_activities(&question_id(1)).await.is_empty());

        let events = notifier.events();
        assert_eq!(
            events.last().map(|e| e.kind),
            Some(ReputationEventKind::VoteCancelled(VoteDirection::Up))
        );
    }

    #[tokio::test]
    async fn cancelling_inactive_vote_is_noop() {
        let store = qa_store();
        let (service, notifier) = service(&store);

        let tally = service
            .cancel_vote(&answer_id(1), &user(VOTER), &user(ANSWERER), VoteDirection::Up)
            .await
            .unwrap();
        assert_eq!(tally.vote_count, 0);
        assert!(notifier.events().is_empty());
    }

    #[tokio::test]
    async fn revote_after_cancel_reuses_records() {
        let store = qa_store();
        let (service, _) = service(&store);

        for _ in 0..2 {
            service
                .vote(&answer_id(1), &user(VOTER), &user(ANSWERER), VoteDirection::Up)
                .await
                .unwrap();
            service
                .cancel_vote(&answer_id(1), &user(VOTER), &user(ANSWERER), VoteDirection::Up)
                .await
                .unwrap();
        }
        service
            .vote(&answer_id(1), &user(VOTER), &user(ANSWERER), VoteDirection::Up)
            .await
            .unwrap();

        assert_eq!(store.all_activities().await.len(), 2);
        assert_eq!(store.vote_count(&answer_id(1)).await, Some(1));
    }

    #[tokio::test]
    async fn comments_take_up_votes_only() {
        let store = qa_store();
        let (service, _) = service(&store);

        let tally = service
            .vote(&comment_id(1), &user(VOTER), &user(ASKER), VoteDirection::Up)
            .await
            .unwrap();
        assert_eq!(tally.vote_count, 1);
        assert_eq!(tally.down_votes, 0);

        let result = service
            .vote(&comment_id(1), &user(VOTER), &user(ASKER), VoteDirection::Down)
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn tags_cannot_be_voted() {
        let store = qa_store();
        let (service, _) = service(&store);

        let result = service
            .vote(&tag_id(1), &user(VOTER), &user(ASKER), VoteDirection::Up)
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn self_vote_is_rejected() {
        let store = qa_store();
        let (service, _) = service(&store);

        let result = service
            .vote(&answer_id(1), &user(ANSWERER), &user(ANSWERER), VoteDirection::Up)
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(store.all_activities().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_voter_is_not_found() {
        let store = qa_store();
        let (service, _) = service(&store);

        let result = service
            .vote(&answer_id(1), &user("404"), &user(ANSWERER), VoteDirection::Up)
            .await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn vote_on_missing_question_writes_nothing() {
        let store = qa_store();
        let (service, notifier) = service(&store);

        let result = service
            .vote(&question_id(9), &user(VOTER), &user(ASKER), VoteDirection::Up)
            .await;

        assert!(matches!(result, Err(DomainError::NotFound(_))));
        assert!(store.all_activities().await.is_empty());
        assert_eq!(store.user_rank(&user(ASKER)).await, Some(10));
        assert_eq!(store.rollbacks(), 1);
        assert!(notifier.events().is_empty());
    }

    #[tokio::test]
    async fn suppressed_award_still_counts_the_vote() {
        let store = qa_store();
        store.seed_daily_earnings(&user(ANSWERER), 200).await;
        let (service, _) = service(&store);

        let tally = service
            .vote(&answer_id(1), &user(VOTER), &user(ANSWERER), VoteDirection::Up)
            .await
            .unwrap();

        assert_eq!(tally.vote_count, 1);
        assert_eq!(store.user_rank(&user(ANSWERER)).await, Some(10));

        let credit = store
            .active_activities(&answer_id(1))
            .await
            .into_iter()
            .find(|a| a.user_id == user(ANSWERER))
            .unwrap();
        assert!(credit.has_rank);
        assert_eq!(credit.rank, 0);
    }

    #[tokio::test]
    async fn storage_failure_rolls_back_whole_vote() {
        let store = qa_store();
        let (service, notifier) = service(&store);

        // Marker and credit succeed, the vote_count update fails
        store.fail_after_writes(3).await;
        let result = service
            .vote(&answer_id(1), &user(VOTER), &user(ANSWERER), VoteDirection::Up)
            .await;

        assert!(matches!(result, Err(DomainError::Storage(_))));
        assert_eq!(store.user_rank(&user(ANSWERER)).await, Some(10));
        assert_eq!(store.vote_count(&answer_id(1)).await, Some(0));
        assert!(store.all_activities().await.is_empty());
        assert!(notifier.events().is_empty());
    }
}
