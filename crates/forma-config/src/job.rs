//! Job file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use forma_core::CrossingRule;
use forma_shapes::{Mode, Plan, RenderOptions, Transform};

use crate::error::ConfigError;

/// A wave-shaping job: shared parameters plus the plans to evaluate.
///
/// # TOML Format
///
/// ```toml
/// name = "Three tone"
/// sample_rate = 44100
/// window = 10000
/// mode = "streaming"
///
/// [[plans]]
/// kind = "iterative"
/// passes = 4
/// [plans.transform]
/// type = "square"
///
/// [[plans]]
/// kind = "combo"
/// [[plans.transforms]]
/// type = "square"
/// bias = 0.1
/// [[plans.transforms]]
/// type = "triangle"
/// rule = "sign-change"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobConfig {
    /// Name of the job.
    #[serde(default = "default_name")]
    pub name: String,

    /// Optional description of the job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample rate used for the time axis when the input carries none.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Window in samples.
    #[serde(default = "default_window")]
    pub window: usize,

    /// Batch or streaming evaluation.
    #[serde(default)]
    pub mode: ModeConfig,

    /// Windowed-RMS memo entries kept in batch mode.
    #[serde(default = "default_memo_capacity")]
    pub memo_capacity: usize,

    /// Plans to evaluate, in output order.
    #[serde(default = "default_plans")]
    pub plans: Vec<PlanConfig>,
}

fn default_name() -> String {
    "Untitled".to_string()
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_window() -> usize {
    10_000
}

fn default_memo_capacity() -> usize {
    32
}

fn default_plans() -> Vec<PlanConfig> {
    vec![PlanConfig::from(&Plan::default())]
}

fn default_passes() -> usize {
    1
}

/// Evaluation mode.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModeConfig {
    /// Whole-array procedures.
    #[default]
    Batch,
    /// Sample-by-sample node graphs.
    Streaming,
}

impl From<ModeConfig> for Mode {
    fn from(mode: ModeConfig) -> Self {
        match mode {
            ModeConfig::Batch => Mode::Batch,
            ModeConfig::Streaming => Mode::Streaming,
        }
    }
}

/// Crossing rule for triangle transforms.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RuleConfig {
    /// Slope disagrees with the held direction.
    #[default]
    Disagreement,
    /// Consecutive slopes have opposite signs.
    SignChange,
}

impl From<RuleConfig> for CrossingRule {
    fn from(rule: RuleConfig) -> Self {
        match rule {
            RuleConfig::Disagreement => CrossingRule::Disagreement,
            RuleConfig::SignChange => CrossingRule::SignChange,
        }
    }
}

impl From<CrossingRule> for RuleConfig {
    fn from(rule: CrossingRule) -> Self {
        match rule {
            CrossingRule::Disagreement => RuleConfig::Disagreement,
            CrossingRule::SignChange => RuleConfig::SignChange,
        }
    }
}

/// One transform in a plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransformConfig {
    /// Square approximation.
    Square {
        /// Offset added before taking the sign.
        #[serde(default)]
        bias: f64,
    },
    /// Triangle approximation.
    Triangle {
        /// Crossing rule.
        #[serde(default)]
        rule: RuleConfig,
    },
}

impl TransformConfig {
    /// Unbiased square.
    pub fn square() -> Self {
        TransformConfig::Square { bias: 0.0 }
    }

    /// Triangle with the default crossing rule.
    pub fn triangle() -> Self {
        TransformConfig::Triangle {
            rule: RuleConfig::default(),
        }
    }
}

impl From<TransformConfig> for Transform {
    fn from(config: TransformConfig) -> Self {
        match config {
            TransformConfig::Square { bias } => Transform::Square { bias },
            TransformConfig::Triangle { rule } => Transform::Triangle { rule: rule.into() },
        }
    }
}

impl From<Transform> for TransformConfig {
    fn from(transform: Transform) -> Self {
        match transform {
            Transform::Square { bias } => TransformConfig::Square { bias },
            Transform::Triangle { rule } => TransformConfig::Triangle { rule: rule.into() },
        }
    }
}

/// One decomposition plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlanConfig {
    /// The same transform applied to successive residuals.
    Iterative {
        /// Number of passes.
        #[serde(default = "default_passes")]
        passes: usize,
        /// The transform.
        transform: TransformConfig,
    },
    /// Different transforms applied in order.
    Combo {
        /// Transforms, one per pass.
        transforms: Vec<TransformConfig>,
    },
}

impl PlanConfig {
    /// `passes` applications of `transform`.
    pub fn iterative(transform: TransformConfig, passes: usize) -> Self {
        PlanConfig::Iterative { passes, transform }
    }

    /// One pass per transform, in order.
    pub fn combo(transforms: impl IntoIterator<Item = TransformConfig>) -> Self {
        PlanConfig::Combo {
            transforms: transforms.into_iter().collect(),
        }
    }

    /// Converts to the runnable plan.
    pub fn to_plan(&self) -> Plan {
        match self {
            PlanConfig::Iterative { passes, transform } => Plan::Iterative {
                transform: (*transform).into(),
                passes: *passes,
            },
            PlanConfig::Combo { transforms } => {
                Plan::Combo(transforms.iter().copied().map(Transform::from).collect())
            }
        }
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let field = |name: &str| format!("plans[{index}].{name}");
        let transforms: &[TransformConfig] = match self {
            PlanConfig::Iterative { passes, transform } => {
                if *passes == 0 {
                    return Err(ConfigError::invalid(field("passes"), "must be at least 1"));
                }
                std::slice::from_ref(transform)
            }
            PlanConfig::Combo { transforms } => {
                if transforms.is_empty() {
                    return Err(ConfigError::invalid(
                        field("transforms"),
                        "must list at least one transform",
                    ));
                }
                transforms
            }
        };
        for t in transforms {
            if let TransformConfig::Square { bias } = t
                && !bias.is_finite()
            {
                return Err(ConfigError::invalid(field("bias"), "must be finite"));
            }
        }
        Ok(())
    }
}

impl From<&Plan> for PlanConfig {
    fn from(plan: &Plan) -> Self {
        match plan {
            Plan::Iterative { transform, passes } => {
                PlanConfig::iterative((*transform).into(), *passes)
            }
            Plan::Combo(transforms) => {
                PlanConfig::combo(transforms.iter().copied().map(TransformConfig::from))
            }
        }
    }
}

impl JobConfig {
    /// Create a job with default parameters and the default plan.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sample_rate: default_sample_rate(),
            window: default_window(),
            mode: ModeConfig::default(),
            memo_capacity: default_memo_capacity(),
            plans: default_plans(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the window in samples.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Set the evaluation mode.
    pub fn with_mode(mut self, mode: ModeConfig) -> Self {
        self.mode = mode;
        self
    }

    /// Set the memo capacity.
    pub fn with_memo_capacity(mut self, capacity: usize) -> Self {
        self.memo_capacity = capacity;
        self
    }

    /// Replace the plan list with a single plan.
    pub fn with_plan(mut self, plan: PlanConfig) -> Self {
        self.plans = vec![plan];
        self
    }

    /// Append a plan.
    pub fn add_plan(mut self, plan: PlanConfig) -> Self {
        self.plans.push(plan);
        self
    }

    /// Load a job from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let job: JobConfig = toml::from_str(&content)?;
        Ok(job)
    }

    /// Load a job from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the job to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the job to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::invalid("sample_rate", "must be positive"));
        }
        if self.window == 0 {
            return Err(ConfigError::invalid("window", "must be at least 1"));
        }
        if self.plans.is_empty() {
            return Err(ConfigError::invalid("plans", "must list at least one plan"));
        }
        for (i, plan) in self.plans.iter().enumerate() {
            plan.validate(i)?;
        }
        Ok(())
    }

    /// The runnable plans, in order.
    pub fn to_plans(&self) -> Vec<Plan> {
        self.plans.iter().map(PlanConfig::to_plan).collect()
    }

    /// Render options for this job at `sample_rate`.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            sample_rate: f64::from(self.sample_rate),
            window: self.window,
            mode: self.mode.into(),
            memo_capacity: self.memo_capacity,
        }
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self::new(default_name())
    }
}
