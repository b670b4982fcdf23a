//! Lead console
//!
//! The command surface driven by the host process. One console owns one
//! session cache and processes commands strictly one at a time.
//!
//! | command | params |
//! |---|---|
//! | `fetch_and_score` | |
//! | `prepare_analysis` | |
//! | `apply_analysis` | `kpi_results` |
//! | `show_dashboard` | |
//! | `rank` | `kpi`, `count?` (5), `ascending?` (false) |
//! | `draft_pitch` | `product_name`, `product_link`, `product_description` |
//! | `send_pitch` | `pitch_map` |
//! | `list_kpis` | |
//! | `reset` | |
//!
//! Collaborator failures come back as failed results; nothing here is fatal.

pub mod transport;

use sdk::collaborator::{Analyst, SocialClient};
use sdk::errors::{ConsoleErrorExt, EngineError};
use sdk::types::{CommandRequest, CommandResult};
use serde_json::json;
use std::time::Duration;

use crate::brief::{self, BriefLimits};
use crate::config::Config;
use crate::dashboard;
use crate::outreach::{OutboundSender, DEFAULT_SEND_DELAY};
use crate::ranker;
use crate::relay::{pitch, scoring, PitchPlan, Product};
use crate::secrets;
use crate::session::kpi::{kpi_names, KPI_CATALOG, LEAD_KPI};
use crate::session::SessionCache;

const DEFAULT_RANK_COUNT: usize = 5;

const NO_ANALYSIS: &str = "No analysis has been run. Please run `fetch_and_score` first.";
const NO_CONVERSATIONS: &str = "No user conversations found to analyze.";
const NO_LEADS: &str = "No potential leads found in the analysis.";
const RUN_ANALYSIS_FIRST: &str = "Please run an analysis first.";

/// Runtime knobs taken from the configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleSettings {
    pub max_threads: usize,
    pub messages_per_thread: usize,
    pub brief_limits: BriefLimits,
    pub send_delay: Duration,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            max_threads: 20,
            messages_per_thread: 20,
            brief_limits: BriefLimits::default(),
            send_delay: DEFAULT_SEND_DELAY,
        }
    }
}

impl ConsoleSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_threads: config.fetch.max_threads,
            messages_per_thread: config.fetch.messages_per_thread,
            brief_limits: config.fetch.brief_limits(),
            send_delay: config.outreach.send_delay(),
        }
    }
}

pub struct LeadConsole {
    cache: SessionCache,
    social: Box<dyn SocialClient>,
    analyst: Box<dyn Analyst>,
    settings: ConsoleSettings,
    sender: OutboundSender,
}

impl LeadConsole {
    pub fn new(
        social: Box<dyn SocialClient>,
        analyst: Box<dyn Analyst>,
        settings: ConsoleSettings,
    ) -> Self {
        let sender = OutboundSender::new(settings.send_delay);
        Self {
            cache: SessionCache::new(),
            social,
            analyst,
            settings,
            sender,
        }
    }

    /// Current session cache
    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// Run one command and turn any error into a failed result
    ///
    /// Failure messages are scrubbed of secret-looking substrings.
    pub async fn dispatch(&mut self, request: &CommandRequest) -> CommandResult {
        tracing::info!("Command: {}", request.command);

        let mut result = match self.execute(request).await {
            Ok(result) => result,
            Err(e) => {
                if e.is_recoverable() {
                    tracing::warn!("{} failed: {}", request.command, e);
                } else {
                    tracing::error!("{} failed: {}", request.command, e);
                }
                CommandResult::from_error(&e)
            }
        };

        if !result.success {
            result.message = result.message.map(|m| secrets::scrub(&m));
        }
        result
    }

    async fn execute(&mut self, request: &CommandRequest) -> Result<CommandResult, EngineError> {
        match request.command.as_str() {
            "fetch_and_score" => self.fetch_and_score().await,
            "prepare_analysis" => self.prepare_analysis().await,
            "apply_analysis" => {
                let results = request.param_json("kpi_results")?.clone();
                self.apply_analysis(results)
            }
            "show_dashboard" => Ok(self.show_dashboard()),
            "rank" => {
                let kpi = request.param_str("kpi")?;
                let count = request
                    .param_usize_opt("count")?
                    .unwrap_or(DEFAULT_RANK_COUNT);
                let ascending = request.param_bool_opt("ascending")?.unwrap_or(false);
                self.rank(&kpi, count, ascending)
            }
            "draft_pitch" => {
                let product = Product {
                    name: request.param_str("product_name")?,
                    link: request.param_str("product_link")?,
                    description: request.param_str("product_description")?,
                };
                self.draft_pitch(&product).await
            }
            "send_pitch" => {
                let plan = pitch::pitch_from_value(request.param_json("pitch_map")?.clone())
                    .map_err(|e| EngineError::InvalidParameter(format!("pitch_map: {}", e)))?;
                Ok(self.send_pitch(&plan).await)
            }
            "list_kpis" => Ok(self.list_kpis()),
            "reset" => Ok(self.reset()),
            other => Err(EngineError::UnknownCommand(other.to_string())),
        }
    }

    /// Fetch threads, rebuild the cache, score it, return the table
    pub async fn fetch_and_score(&mut self) -> Result<CommandResult, EngineError> {
        let cached = self.refresh_cache().await?;
        if cached == 0 {
            return Ok(CommandResult::ok_message(NO_CONVERSATIONS));
        }

        let scores = scoring::request_scores(self.analyst.as_ref(), &self.cache).await?;
        let scored = scoring::merge(&mut self.cache, scores);

        Ok(CommandResult::ok(json!({
            "analyzed": cached,
            "scored": scored,
            "analysis_table": dashboard::render(&self.cache, &kpi_names()),
        })))
    }

    /// Fetch and cache, then hand the scoring prompt back to the host
    ///
    /// For hosts that act as the analyst themselves. Pair with
    /// `apply_analysis`.
    pub async fn prepare_analysis(&mut self) -> Result<CommandResult, EngineError> {
        let cached = self.refresh_cache().await?;
        if cached == 0 {
            return Ok(CommandResult::ok_message(NO_CONVERSATIONS));
        }

        Ok(CommandResult::ok(json!({
            "analyzed": cached,
            "action": "Score the briefs with 'prompt_for_analyst', then pass the JSON reply to `apply_analysis` as 'kpi_results'.",
            "prompt_for_analyst": scoring::analysis_prompt(&self.cache),
        })))
    }

    /// Merge host-supplied scores and return the table
    pub fn apply_analysis(
        &mut self,
        kpi_results: serde_json::Value,
    ) -> Result<CommandResult, EngineError> {
        if self.cache.is_empty() {
            return Ok(CommandResult::failure(NO_ANALYSIS));
        }

        let scores = scoring::scores_from_value(kpi_results)?;
        if scores.is_empty() {
            return Ok(CommandResult::failure("KPI results cannot be empty."));
        }

        let scored = scoring::merge(&mut self.cache, scores);
        Ok(CommandResult::ok(json!({
            "scored": scored,
            "analysis_table": dashboard::render(&self.cache, &kpi_names()),
        })))
    }

    pub fn show_dashboard(&self) -> CommandResult {
        if self.cache.is_empty() {
            return CommandResult::failure(NO_ANALYSIS);
        }
        CommandResult::ok(json!({
            "analysis_table": dashboard::render(&self.cache, &kpi_names()),
        }))
    }

    pub fn rank(&self, kpi: &str, count: usize, ascending: bool) -> Result<CommandResult, EngineError> {
        let leads = ranker::top_n(&self.cache, kpi, count, ascending)?;
        Ok(CommandResult::ok(json!({
            "kpi": kpi,
            "ascending": ascending,
            "leads": leads,
            "analysis_table": dashboard::render_leads(&leads, &kpi_names()),
        })))
    }

    /// Ask the analyst for a pitch aimed at the top spender
    pub async fn draft_pitch(&self, product: &Product) -> Result<CommandResult, EngineError> {
        if self.cache.is_empty() {
            return Ok(CommandResult::failure(RUN_ANALYSIS_FIRST));
        }

        let leads = ranker::top_n(&self.cache, LEAD_KPI, 1, false)?;
        let Some(lead) = leads.first() else {
            return Ok(CommandResult::ok_message(NO_LEADS));
        };

        let plan = pitch::draft(self.analyst.as_ref(), product, lead).await?;
        Ok(CommandResult::ok(json!({
            "target": lead,
            "pitch_map": plan,
        })))
    }

    /// Send every message of the plan; never fails as a whole
    pub async fn send_pitch(&self, plan: &PitchPlan) -> CommandResult {
        let report = self.sender.send(self.social.as_ref(), plan).await;
        CommandResult::ok(json!(report)).with_message(format!(
            "Pitch successfully sent to {} user(s).",
            report.sent_count()
        ))
    }

    pub fn list_kpis(&self) -> CommandResult {
        CommandResult::ok(json!({ "kpis": KPI_CATALOG }))
    }

    pub fn reset(&mut self) -> CommandResult {
        self.cache.reset();
        CommandResult::ok_message("Session cleared.")
    }

    /// Fetch threads and rebuild the cache from their briefs
    ///
    /// A failed fetch leaves the cache as it was. Returns the record count.
    async fn refresh_cache(&mut self) -> Result<usize, EngineError> {
        let threads = self
            .social
            .list_recent_threads(self.settings.max_threads, self.settings.messages_per_thread)
            .await?;

        let briefs = brief::build_all(
            &threads,
            self.social.self_identity(),
            self.settings.brief_limits,
        );
        tracing::info!(
            "Built {} brief(s) from {} thread(s)",
            briefs.len(),
            threads.len()
        );

        self.cache.reset();
        for b in briefs {
            self.cache.upsert_brief(b.identity, b.display_name, b.messages);
        }
        Ok(self.cache.len())
    }
}
