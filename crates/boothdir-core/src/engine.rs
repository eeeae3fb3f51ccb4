use crate::config::{self, BoothConfig, OptionSpec};
use crate::paths::{self, BaseDir};
use crate::suffix;
use crate::threshold::Threshold;
use chrono::{Local, NaiveDateTime, Timelike};
use std::fs;
use strum::VariantNames;
use tracing::{debug, info, warn};

pub const DIRECTORY_SECTION: &str = "GENERAL";
pub const DIRECTORY_KEY: &str = "directory";
pub const OPTIONS_SECTION: &str = "DATE_FOLDER";

/// How a mid-session threshold change picks the effective date.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[strum(serialize_all = "snake_case")]
pub enum OnChangeMode {
    /// Apply the plain before/after rule, as if the new threshold had always
    /// been configured.
    #[default]
    Strict,
    /// Switch to today's folder immediately, regardless of the rule.
    ForceToday,
}

impl OnChangeMode {
    fn from_config(cfg: &BoothConfig) -> Self {
        let raw = cfg
            .get(OPTIONS_SECTION, "on_change_mode")
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        raw.parse().unwrap_or_else(|_| {
            debug!("unrecognized on_change_mode {raw:?}; using strict");
            Self::Strict
        })
    }
}

/// Whether a newly applied directory list is also written back to the
/// configuration file. In-memory only is the default: disabling the feature
/// then reverts the directory on the next restart without leaving dated
/// paths behind in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiskSync {
    #[default]
    InMemoryOnly,
    Persist,
}

/// Session state for the dated-directory switch.
///
/// The host calls one hook at a time; `&mut self` makes that contract
/// explicit, so there is no interior locking. State lives for the process
/// lifetime and only advances when a new suffix is actually applied.
#[derive(Debug, Default)]
pub struct DateFolderEngine {
    sync: DiskSync,
    disabled: bool,
    bases: Vec<BaseDir>,
    last_threshold: Option<String>,
    current_suffix: Option<String>,
    last_targets: Vec<String>,
}

impl DateFolderEngine {
    pub fn new(sync: DiskSync) -> Self {
        Self {
            sync,
            ..Self::default()
        }
    }

    /// Mirror of the host's plugin-enabled switch. A disabled engine keeps
    /// republishing the un-dated bases instead of dated targets.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }

    pub fn bases(&self) -> &[BaseDir] {
        &self.bases
    }

    pub fn current_suffix(&self) -> Option<&str> {
        self.current_suffix.as_deref()
    }

    /// Startup hook: persist newly registered options so the options section
    /// exists in the file before any dated directory is computed.
    pub fn on_startup(&mut self, cfg: &BoothConfig) {
        if let Err(err) = cfg.save() {
            warn!("cannot persist registered options: {err}");
        }
    }

    /// Configuration hook: register the options, snapshot the bases, and
    /// publish them un-dated.
    pub fn on_configure(&mut self, cfg: &mut BoothConfig) {
        register_options(cfg);
        self.load_bases(cfg);
        self.publish_bases(cfg);
    }

    /// Wait-state hook, evaluated at the current wall-clock time.
    pub fn on_wait_enter(&mut self, cfg: &mut BoothConfig) {
        self.tick_at(cfg, Local::now().naive_local());
    }

    /// Cleanup hook: restore the un-dated bases so the host shuts down (or
    /// disables the feature) with its original directories.
    pub fn on_cleanup(&mut self, cfg: &mut BoothConfig) {
        if self.bases.is_empty() {
            self.load_bases(cfg);
        }
        self.publish_bases(cfg);
    }

    /// One wait-state pass at an explicit instant.
    ///
    /// Never fails across the hook boundary: filesystem and file-write
    /// problems degrade to warnings and the bookkeeping still advances.
    pub fn tick_at(&mut self, cfg: &mut BoothConfig, now: NaiveDateTime) {
        if self.disabled {
            if self.bases.is_empty() {
                self.load_bases(cfg);
            }
            self.publish_bases(cfg);
            info!("date folders disabled; keeping base directories");
            return;
        }

        if self.bases.is_empty() {
            self.load_bases(cfg);
        }

        let threshold = Threshold::from_config(cfg);
        let mode = OnChangeMode::from_config(cfg);
        let thr = threshold.to_string();

        let effective = match self.last_threshold.as_deref() {
            // threshold changed mid-session
            Some(last) if last != thr => match mode {
                OnChangeMode::Strict => threshold.effective_date(now),
                OnChangeMode::ForceToday => now.date(),
            },
            _ => threshold.effective_date(now),
        };
        self.last_threshold = Some(thr.clone());

        let new_suffix = suffix::format(effective, &threshold);

        // Unchanged suffix with live targets: republish and leave the
        // filesystem alone. This is the steady state between day switches.
        if self.current_suffix.as_deref() == Some(new_suffix.as_str())
            && !self.last_targets.is_empty()
        {
            let quoted = quote_list(&self.last_targets);
            cfg.set(DIRECTORY_SECTION, DIRECTORY_KEY, &quoted);
            info!("reusing {new_suffix} (mode={mode})");
            return;
        }

        if self.bases.is_empty() {
            debug!("no base directories configured; nothing to switch");
            return;
        }

        let targets = self.build_targets(&new_suffix);
        ensure_dirs_exist(&targets);

        let quoted = quote_list(&targets);
        cfg.set(DIRECTORY_SECTION, DIRECTORY_KEY, &quoted);
        if self.sync == DiskSync::Persist {
            self.sync_directory_line(cfg, &quoted);
        }

        self.current_suffix = Some(new_suffix);
        self.last_targets = targets;
        info!(
            "mode={mode} threshold={thr} now={:02}:{:02} -> {quoted}",
            now.hour(),
            now.minute()
        );
    }

    fn load_bases(&mut self, cfg: &BoothConfig) {
        let raw = cfg
            .get(DIRECTORY_SECTION, DIRECTORY_KEY)
            .unwrap_or_default();
        self.bases = paths::resolve_bases(raw);
        let displays: Vec<&str> = self.bases.iter().map(|b| b.display.as_str()).collect();
        info!("bases = {displays:?}");
    }

    fn publish_bases(&self, cfg: &mut BoothConfig) {
        if self.bases.is_empty() {
            return;
        }
        let displays: Vec<String> = self.bases.iter().map(|b| b.display.clone()).collect();
        cfg.set(DIRECTORY_SECTION, DIRECTORY_KEY, &quote_list(&displays));
    }

    fn build_targets(&self, suffix: &str) -> Vec<String> {
        self.bases
            .iter()
            .map(|base| format!("{}/{suffix}", base.display.trim_end_matches('/')))
            .collect()
    }

    fn sync_directory_line(&self, cfg: &BoothConfig, value: &str) {
        let Some(path) = cfg.path() else {
            return;
        };
        match config::rewrite_key_on_disk(path, DIRECTORY_SECTION, DIRECTORY_KEY, value) {
            Ok(true) => debug!("directory line updated in {}", path.display()),
            Ok(false) => {}
            Err(err) => warn!("cannot update directory line: {err}"),
        }
    }
}

fn register_options(cfg: &mut BoothConfig) {
    let hours: Vec<String> = (0..24).map(|h| h.to_string()).collect();
    let minutes: Vec<String> = (0..60).map(|m| format!("{m:02}")).collect();

    cfg.add_option(OptionSpec {
        section: OPTIONS_SECTION.into(),
        key: "start_hour".into(),
        default: "10".into(),
        description: "Hour (0-23) at which a new day's folder starts".into(),
        label: "Start hour".into(),
        choices: hours,
    });
    cfg.add_option(OptionSpec {
        section: OPTIONS_SECTION.into(),
        key: "start_minute".into(),
        default: "00".into(),
        description: "Minute (00-59) at which a new day's folder starts".into(),
        label: "Start minute".into(),
        choices: minutes,
    });
    cfg.add_option(OptionSpec {
        section: OPTIONS_SECTION.into(),
        key: "on_change_mode".into(),
        default: OnChangeMode::Strict.to_string(),
        description: "How a changed start time is applied: strict or force_today".into(),
        label: "On-change mode".into(),
        choices: OnChangeMode::VARIANTS
            .iter()
            .map(|v| v.to_string())
            .collect(),
    });
}

fn ensure_dirs_exist(targets: &[String]) {
    for target in targets {
        let path = paths::expand_tilde(target);
        if let Err(err) = fs::create_dir_all(&path) {
            warn!("cannot create {target}: {err}");
        }
    }
}

fn quote_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
