use thiserror::Error;
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("invalid range: need finite min_db ({min_db}) below max_db ({max_db})")]
    InvalidRange { min_db: f32, max_db: f32 },
    #[error("spectrum percent must be within 0..=100, got {0}")]
    PercentOutOfRange(i32),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for DisplayError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        DisplayError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for DisplayError {
    fn from(value: image::ImageError) -> Self {
        DisplayError::Plot(value.to_string())
    }
}
