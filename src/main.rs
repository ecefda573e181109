// Demo entry point for the card reading service core. Prints the same
// JSON envelope the web layer returns: {"data": ...} on success,
// {"message": ...} on a client-data failure.

use cardscan::CardService;
use clap::{Parser, ValueEnum};
use serde_json::json;
use std::path::PathBuf;
use std::process;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Read the printed card face with OCR
    Ocr,
    /// Decode the embedded QR code
    Qr,
}

#[derive(Parser)]
#[command(name = "cardscan", about = "Read identity-card fields from a photo")]
struct Args {
    /// Path to the card photo (JPEG or PNG)
    image: PathBuf,

    /// Extraction pipeline to run
    #[arg(long, value_enum, default_value = "ocr")]
    mode: Mode,

    /// Language hint passed to the text recognizer
    #[arg(long, default_value = "vie")]
    lang: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let image_bytes = match std::fs::read(&args.image) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Failed to read {}: {}", args.image.display(), e);
            process::exit(1);
        }
    };

    let service = CardService::new().with_language(&args.lang);
    let result = match args.mode {
        Mode::Ocr => service.read_card(&image_bytes).map(|fields| json!({ "data": fields })),
        Mode::Qr => service
            .scan_qrcode(&image_bytes)
            .map(|fields| json!({ "data": fields })),
    };

    match result {
        Ok(envelope) => {
            println!("{}", serde_json::to_string_pretty(&envelope).unwrap_or_default());
        }
        Err(err) => {
            let envelope = json!({ "message": err.to_string() });
            println!("{}", serde_json::to_string_pretty(&envelope).unwrap_or_default());
            process::exit(if err.is_client_error() { 1 } else { 2 });
        }
    }
}
