//! CLI Docs Subcommands
//!
//! List the indexed papers and upload new PDFs.

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use zeorag_app::{read_upload, DocumentPanel};
use zeorag_core::RagBackend;

use crate::terminal_output::{note_info, note_success};

#[derive(Subcommand)]
pub enum DocCommands {
    /// List indexed papers
    List,
    /// Upload a PDF to the corpus
    Upload {
        /// Path to the PDF file
        path: PathBuf,
    },
}

pub async fn run(cmd: DocCommands, backend: &dyn RagBackend) -> Result<()> {
    let mut panel = DocumentPanel::new();
    match cmd {
        DocCommands::List => {
            panel.refresh(backend).await?;
            if panel.documents().is_empty() {
                note_info("No papers indexed yet.");
            }
            for doc in panel.documents() {
                println!("  {doc}");
            }
        }
        DocCommands::Upload { path } => {
            let upload = read_upload(&path).await?;
            let filename = panel.upload(backend, Some(upload)).await?;
            note_success(&format!("Uploaded {filename}"));
        }
    }
    Ok(())
}
