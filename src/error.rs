use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The transform has no inverse, so nothing can be mapped back into its local space.
    #[error("transform is not invertible")]
    SingularTransform,

    #[error("ray direction must be finite and non-zero")]
    DegenerateRay,

    /// A pattern id that was not produced by the arena it was given to.
    #[error("unknown pattern #{0}")]
    UnknownPattern(u32),

    #[error("a {width}x{height} canvas is too large")]
    CanvasTooLarge { width: u32, height: u32 },

    #[error("a render worker panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, Error>;
