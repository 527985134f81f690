// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator-channel update ingestion.
//!
//! One ingestor serves every bridged business. Updates arrive over two
//! paths, a long-running poll loop and per-business webhooks, and both
//! funnel through [`Ingestor::handle_update`] so dedup and dispatch
//! behave identically.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use frontdesk_config::model::PollerConfig;
use frontdesk_core::{Business, FrontdeskError, OperatorApi, OperatorEvent, OperatorUpdate};
use frontdesk_storage::queries::businesses;
use frontdesk_storage::Database;
use tracing::{debug, error, info, warn};

use crate::commands::{parse_callback, parse_text, CallbackCommand, TextCommand};
use crate::{handoff, review};

/// Bounded set of recently seen `(business_id, update_id)` pairs.
///
/// Oldest entries are evicted first once capacity is reached.
struct DedupSet {
    capacity: usize,
    seen: HashSet<(String, i64)>,
    order: VecDeque<(String, i64)>,
}

impl DedupSet {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seen: HashSet::new(),
            order: VecDeque::new(),
        }
    }

    /// Returns `false` if the key was already present.
    fn insert(&mut self, key: (String, i64)) -> bool {
        if !self.seen.insert(key.clone()) {
            return false;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        true
    }
}

/// Dispatches operator-channel updates for all bridged businesses.
pub struct Ingestor {
    db: Arc<Database>,
    operator: Arc<dyn OperatorApi>,
    config: PollerConfig,
    dedup: Mutex<DedupSet>,
    started: AtomicBool,
}

impl Ingestor {
    pub fn new(db: Arc<Database>, operator: Arc<dyn OperatorApi>, config: PollerConfig) -> Self {
        let dedup = Mutex::new(DedupSet::new(config.dedup_capacity));
        Self {
            db,
            operator,
            config,
            dedup,
            started: AtomicBool::new(false),
        }
    }

    /// Process one update for one business.
    ///
    /// Returns `true` if the update was dispatched and `false` if it was
    /// a duplicate, came from an unauthorized chat, or decoded to nothing
    /// actionable.
    pub async fn handle_update(
        &self,
        business_id: &str,
        update: OperatorUpdate,
    ) -> Result<bool, FrontdeskError> {
        let fresh = self
            .dedup
            .lock()
            .map_err(|_| FrontdeskError::Channel {
                message: "dedup set lock poisoned".into(),
                source: None,
            })?
            .insert((business_id.to_string(), update.update_id));
        if !fresh {
            debug!(business_id, update_id = update.update_id, "duplicate update dropped");
            return Ok(false);
        }

        // Reload on every update: handoff pointers move between updates
        // in the same batch.
        let Some(business) = businesses::get_business(&self.db, business_id).await? else {
            warn!(business_id, "update for unknown business dropped");
            return Ok(false);
        };

        match update.event {
            OperatorEvent::Callback { id, data, .. } => {
                self.handle_callback(&business, &id, &data).await
            }
            OperatorEvent::Text {
                chat_id,
                text,
                message_id,
            } => {
                if chat_id != business.operator_chat_id {
                    debug!(business_id, chat_id, "text from unauthorized chat ignored");
                    return Ok(false);
                }
                self.handle_text(&business, &text, message_id).await
            }
        }
    }

    async fn handle_callback(
        &self,
        business: &Business,
        callback_id: &str,
        data: &str,
    ) -> Result<bool, FrontdeskError> {
        let Some(command) = parse_callback(data) else {
            debug!(data, "unrecognized callback token ignored");
            return Ok(false);
        };
        match command {
            CallbackCommand::ApproveAppointment(id) => {
                review::apply_decision(&self.db, self.operator.as_ref(), business, id, true, callback_id)
                    .await?;
            }
            CallbackCommand::DeclineAppointment(id) => {
                review::apply_decision(&self.db, self.operator.as_ref(), business, id, false, callback_id)
                    .await?;
            }
            CallbackCommand::AcceptHandoff(id) => {
                handoff::accept(&self.db, self.operator.as_ref(), business, id, callback_id).await?;
            }
            CallbackCommand::DeclineHandoff(id) => {
                handoff::decline(&self.db, self.operator.as_ref(), business, id, callback_id).await?;
            }
            CallbackCommand::EndHandoff(id) => {
                handoff::end(&self.db, self.operator.as_ref(), business, id, Some(callback_id))
                    .await?;
            }
        }
        Ok(true)
    }

    async fn handle_text(
        &self,
        business: &Business,
        text: &str,
        message_id: i64,
    ) -> Result<bool, FrontdeskError> {
        match parse_text(text) {
            TextCommand::Reply { request_id, text } => {
                handoff::targeted_reply(
                    &self.db,
                    self.operator.as_ref(),
                    business,
                    request_id,
                    &text,
                    message_id,
                )
                .await?;
                Ok(true)
            }
            TextCommand::End(request_id) => {
                handoff::end(&self.db, self.operator.as_ref(), business, request_id, None).await?;
                Ok(true)
            }
            TextCommand::Tunnel(text) => {
                handoff::tunnel_reply(&self.db, business, &text).await?;
                Ok(true)
            }
            TextCommand::Noop => Ok(false),
        }
    }

    /// Pull updates for every bridged business once and advance cursors.
    ///
    /// Failures are isolated per business so one broken bot token cannot
    /// starve the rest.
    pub async fn poll_once(&self) -> Result<(), FrontdeskError> {
        let bridged = businesses::list_bridged_businesses(&self.db).await?;
        for business in bridged {
            if let Err(e) = self.poll_business(&business).await {
                warn!(business_id = %business.business_id, error = %e, "poll cycle failed");
            }
        }
        Ok(())
    }

    async fn poll_business(&self, business: &Business) -> Result<(), FrontdeskError> {
        let updates = self
            .operator
            .get_updates(&business.bot_token, business.update_offset)
            .await?;

        let mut next_offset = business.update_offset;
        for update in updates {
            next_offset = next_offset.max(update.update_id + 1);
            let update_id = update.update_id;
            if let Err(e) = self.handle_update(&business.business_id, update).await {
                warn!(
                    business_id = %business.business_id,
                    update_id,
                    error = %e,
                    "failed to handle update"
                );
            }
        }

        // The cursor moves past failed updates too; redelivery is not
        // worth replaying side effects that already partially ran.
        // It is committed once per batch, not per update. A crash mid-batch
        // redelivers the whole batch on restart and the handlers stay
        // idempotent for exactly that case.
        if next_offset != business.update_offset {
            businesses::set_update_offset(&self.db, &business.business_id, next_offset).await?;
        }
        Ok(())
    }

    /// Run the poll loop until the process exits. Only one loop per
    /// ingestor; later calls return immediately.
    pub async fn run(self: Arc<Self>) {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("poll loop already running");
            return;
        }
        info!(
            interval_secs = self.config.poll_interval_secs,
            "operator poll loop started"
        );
        let interval = Duration::from_secs(self.config.poll_interval_secs);
        let backoff = Duration::from_secs(self.config.error_backoff_secs);
        loop {
            tokio::time::sleep(interval).await;
            if let Err(e) = self.poll_once().await {
                error!(error = %e, "poll loop error, backing off");
                tokio::time::sleep(backoff).await;
            }
        }
    }
}
