use closing_checklist_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("closing-checklist: {err}");
        std::process::exit(1);
    }
}
