#[tokio::main]
async fn main() {
    trainer_desk::run().await;
}
