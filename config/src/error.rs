//! CLI validation errors, mirroring the fatal-error conditions
//! `handle_options` checks before a run starts.

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("attacker hash power must be between 0.0 and 1.0, got {0}")]
    InvalidHashpower(f64),

    #[error("catchup tolerance {value} exceeds the maximum kept depth {max}")]
    CatchupToleranceTooLarge { value: u64, max: u64 },

    #[error("attack start time must be >= 0.0, got {0}")]
    InvalidStartTime(f64),

    #[error("--depth only applies to selfish mining, not the 51% attack")]
    DepthNotApplicableToFiftyOne,

    #[error("--hashpower, --depth, --catchup-tolerance, or --start-time was given but no attack was selected with --attack")]
    AttackOptionWithoutAttack,

    #[error("running an attack needs at least 2 nodes, got {0}")]
    NotEnoughNodesForAttack(u32),

    #[error("output path {path} must end in .json")]
    OutputMissingJsonExtension { path: String },

    #[error("could not create or write results directory {path}: {source}")]
    ResultsDirUnwritable { path: String, source: std::io::Error },
}
