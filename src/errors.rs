use thiserror::Error;

/// Error kinds surfaced by stew commands.
///
/// Messages are plain text; coloring happens in [`crate::render`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StewError {
    #[error("Could not find any releases for https://github.com/{owner}/{repo}")]
    ReleasesNotFound { owner: String, repo: String },

    #[error("Could not find any assets for release {tag}")]
    AssetsNotFound { tag: String },

    #[error("Could not automatically detect the release asset matching your OS/Arch. Options: {}", .options.join(", "))]
    AmbiguousAssetSelection { options: Vec<String> },

    #[error("Could not automatically detect the binary. Options: {}", .options.join(", "))]
    CouldntDetectBinary { options: Vec<String> },

    #[error("Overwrite of {binary} aborted")]
    AbortBinaryOverwrite { binary: String },

    #[error("Cannot remove from an empty packages slice in the lockfile")]
    NoPackagesInLockfile,

    #[error("Index out of bounds in lockfile packages")]
    IndexOutOfBoundsInLockfile,

    #[error("Input cannot be empty. Use the --help flag for more info")]
    EmptyCliInput,

    #[error("Cannot use the --all flag with a positional argument")]
    CliFlagAndInput,

    #[error("Input was not recognized as a URL or GitHub repo: {input}")]
    UnrecognizedInput { input: String },

    #[error("The {asset} asset has already been downloaded and installed")]
    AssetAlreadyDownloaded { asset: String },

    #[error("The binary {binary} is not currently installed")]
    BinaryNotInstalled { binary: String },

    #[error("The binary {binary} is already installed")]
    BinaryAlreadyInstalled { binary: String },

    #[error("No binaries are currently installed")]
    NoBinariesInstalled,

    #[error("The {binary} binary was installed directly from a URL")]
    InstalledFromUrl { binary: String },

    #[error("The latest tag {tag} is already installed")]
    AlreadyInstalledLatestTag { tag: String },

    #[error("Received non-zero status code from HTTP request: {status}")]
    NonZeroStatusCode { status: u16 },

    #[error("Exited from user selection: {reason}")]
    PromptCancelled { reason: String },

    #[error("Cannot prompt in batch mode: {prompt}")]
    InteractiveInBatch { prompt: String },

    #[error("Unsupported archive format: {path}")]
    UnsupportedArchive { path: String },

    #[error("{failed} of {total} packages failed to install")]
    BatchFailures { failed: usize, total: usize },
}

impl StewError {
    /// Whether this error is an expected, user-initiated stop rather than a failure
    pub fn is_clean_abort(&self) -> bool {
        matches!(
            self,
            StewError::AbortBinaryOverwrite { .. }
                | StewError::AlreadyInstalledLatestTag { .. }
                | StewError::AssetAlreadyDownloaded { .. }
        )
    }
}
