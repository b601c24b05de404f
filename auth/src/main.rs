use auth::error::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    auth::app::run().await
}
