// Application layer - Use case interactors

pub mod container;
pub mod inspect_interactor;
pub mod label_interactor;
pub mod study_interactor;

// Re-export interactors
pub use inspect_interactor::InspectInteractor;
pub use label_interactor::LabelSession;
pub use study_interactor::StudyInteractor;
