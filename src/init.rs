use crate::facility::LoggingFacility;
use crate::layer::FacilityLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Errors from installing process-wide logging state.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("global logging facility is already initialized")]
    AlreadyInitialized,

    #[error(transparent)]
    SetGlobalDefault(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install a [`Registry`] combined with [`FacilityLayer`] as the global
/// default `tracing` subscriber, so `tracing::info!` and friends go
/// through `facility`'s console and file path.
///
/// **Returns**
/// - `Err(InitError::SetGlobalDefault)` if another subscriber was
///   already installed.
pub fn try_init_tracing(facility: &LoggingFacility) -> Result<(), InitError> {
    let subscriber = Registry::default().with(FacilityLayer::new(facility));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Same as [`try_init_tracing`], reporting failure on stderr instead of
/// returning it.
pub fn init_tracing(facility: &LoggingFacility) {
    if let Err(e) = try_init_tracing(facility) {
        eprintln!("tracing subscriber not installed: {}", e);
    }
}
