//! Outgoing letters: the askama letter template filled with a mail's fields,
//! rasterized to PDF by an external command and stored next to the uploads.

use askama::Template;
use std::{
    path::{Path, PathBuf},
    process::Stdio,
    sync::Arc,
};
use tokio::io::AsyncWriteExt;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("filling letter template: {0}")]
    Template(#[from] askama::Error),
    #[error("starting rasterizer {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("rasterizer exited with {status}: {stderr}")]
    Rasterizer {
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("rasterizer produced no output")]
    EmptyOutput,
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Turns letter markup into PDF bytes.
#[async_trait::async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, markup: &str) -> Result<Vec<u8>, RenderError>;
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RasterizerConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for RasterizerConfig {
    fn default() -> Self {
        Self {
            program: "wkhtmltopdf".to_owned(),
            args: vec!["--quiet".to_owned(), "-".to_owned(), "-".to_owned()],
        }
    }
}

/// Pipes the markup into an HTML to PDF command and reads the document from
/// its standard output.
pub struct CommandRasterizer {
    config: RasterizerConfig,
}

impl CommandRasterizer {
    pub fn new(config: RasterizerConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl Rasterizer for CommandRasterizer {
    #[tracing::instrument(skip(self, markup), fields(program = %self.config.program))]
    async fn rasterize(&self, markup: &str) -> Result<Vec<u8>, RenderError> {
        let spawn_error = |source| RenderError::Spawn {
            program: self.config.program.clone(),
            source,
        };
        let mut child = tokio::process::Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;
        // fed from a separate task so a full stdout pipe cannot stall the write
        let writer = child.stdin.take().map(|mut stdin| {
            let markup = markup.to_owned();
            tokio::spawn(async move {
                stdin.write_all(markup.as_bytes()).await?;
                stdin.shutdown().await
            })
        });
        let output = child.wait_with_output().await.map_err(spawn_error)?;
        if let Some(writer) = writer {
            if let Ok(Err(err)) = writer.await {
                tracing::debug!("rasterizer closed its input early: {err}");
            }
        }
        if !output.status.success() {
            return Err(RenderError::Rasterizer {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        if output.stdout.is_empty() {
            return Err(RenderError::EmptyOutput);
        }
        Ok(output.stdout)
    }
}

/// Everything printed on an outgoing letter.
#[derive(Debug)]
pub struct LetterContext {
    pub mail_id: i32,
    pub mail_number: String,
    pub subject: String,
    /// `YYYY-MM-DD`, or empty when the mail is undated.
    pub date: String,
    pub recipient: String,
    pub body: String,
    pub assigned_names: Vec<String>,
}

impl LetterContext {
    pub fn new(mail: &arsip_db::models::OutgoingMail, assigned_names: Vec<String>) -> Self {
        Self {
            mail_id: mail.id,
            mail_number: mail.mail_number.clone().unwrap_or_default(),
            subject: mail.subject.clone(),
            date: mail
                .mail_date
                .as_ref()
                .map(|date| date.to_jiff().to_string())
                .unwrap_or_default(),
            recipient: mail.recipient.clone().unwrap_or_default(),
            body: mail.body.clone(),
            assigned_names,
        }
    }
}

#[derive(Template)]
#[template(path = "letter/outgoing.html")]
struct OutgoingLetterTemplate<'a> {
    organization_header: &'a str,
    letter: &'a LetterContext,
}

pub struct LetterRenderer {
    output_dir: PathBuf,
    organization_header: String,
    rasterizer: Arc<dyn Rasterizer>,
}

impl LetterRenderer {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        organization_header: impl Into<String>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            organization_header: organization_header.into(),
            rasterizer,
        }
    }

    pub fn filename_for(mail_id: i32) -> String {
        format!("surat_keluar_{mail_id}.pdf")
    }

    /// Renders and stores the letter, returning its file name inside the
    /// output directory. Nothing is left on disk when any step fails.
    #[tracing::instrument(skip(self, letter), fields(mail_id = letter.mail_id))]
    pub async fn render(&self, letter: &LetterContext) -> Result<String, RenderError> {
        let markup = OutgoingLetterTemplate {
            organization_header: &self.organization_header,
            letter,
        }
        .render()?;
        let pdf = self.rasterizer.rasterize(&markup).await?;
        let filename = Self::filename_for(letter.mail_id);
        write_atomically(&self.output_dir, &filename, &pdf).await?;
        tracing::info!("rendered letter {filename} ({} bytes)", pdf.len());
        Ok(filename)
    }
}

async fn write_atomically(dir: &Path, filename: &str, content: &[u8]) -> Result<(), RenderError> {
    let write_error = |path: &Path| {
        let path = path.to_owned();
        move |source: std::io::Error| RenderError::Write { path, source }
    };
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(write_error(dir))?;
    let partial = dir.join(format!(".{filename}.partial"));
    let target = dir.join(filename);
    if let Err(err) = tokio::fs::write(&partial, content).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(write_error(&partial)(err));
    }
    if let Err(err) = tokio::fs::rename(&partial, &target).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(write_error(&target)(err));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Hands the markup back as the "PDF" so tests can look inside the letter.
    pub(crate) struct MarkupRasterizer;

    #[async_trait::async_trait]
    impl Rasterizer for MarkupRasterizer {
        async fn rasterize(&self, markup: &str) -> Result<Vec<u8>, RenderError> {
            Ok(markup.as_bytes().to_vec())
        }
    }

    pub(crate) struct FailingRasterizer;

    #[async_trait::async_trait]
    impl Rasterizer for FailingRasterizer {
        async fn rasterize(&self, _markup: &str) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::EmptyOutput)
        }
    }

    fn letter(assigned_names: Vec<String>) -> LetterContext {
        LetterContext {
            mail_id: 7,
            mail_number: "800.12".to_owned(),
            subject: "Undangan".to_owned(),
            date: "2024-05-02".to_owned(),
            recipient: "Dinas X".to_owned(),
            body: "Dengan hormat, <b>rapat</b> diadakan.".to_owned(),
            assigned_names,
        }
    }

    #[tokio::test]
    async fn it_writes_the_letter_named_after_the_mail_id() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = LetterRenderer::new(
            dir.path().join("uploads"),
            "KOP",
            Arc::new(MarkupRasterizer),
        );
        let filename = renderer
            .render(&letter(vec!["Budi".to_owned(), "Eko".to_owned()]))
            .await
            .unwrap();
        assert_eq!(filename, "surat_keluar_7.pdf");
        let written = std::fs::read_to_string(dir.path().join("uploads").join(&filename)).unwrap();
        assert!(written.contains("KOP"));
        assert!(written.contains("800.12"));
        assert!(written.contains("2024-05-02"));
        let budi = written.find("Budi").expect("assigned names should be listed");
        let eko = written.find("Eko").expect("assigned names should be listed");
        assert!(budi < eko, "names should keep their order");
        assert!(
            written.contains("&lt;b&gt;rapat&lt;/b&gt;"),
            "body should be escaped"
        );
    }

    #[tokio::test]
    async fn it_leaves_no_file_when_rasterizing_fails() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = LetterRenderer::new(dir.path(), "KOP", Arc::new(FailingRasterizer));
        let result = renderer.render(&letter(Vec::new())).await;
        assert!(matches!(result, Err(RenderError::EmptyOutput)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn it_removes_the_partial_file_when_the_rename_fails() {
        let dir = tempfile::tempdir().unwrap();
        // a directory in the way of the target makes the rename fail
        std::fs::create_dir_all(dir.path().join("surat_keluar_7.pdf").join("occupied")).unwrap();
        let result = write_atomically(dir.path(), "surat_keluar_7.pdf", b"%PDF-1.4").await;
        assert!(matches!(result, Err(RenderError::Write { .. })));
        assert!(!dir.path().join(".surat_keluar_7.pdf.partial").exists());
        assert!(dir.path().join("surat_keluar_7.pdf").is_dir());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn it_pipes_markup_through_the_configured_command() {
        let rasterizer = CommandRasterizer::new(RasterizerConfig {
            program: "cat".to_owned(),
            args: Vec::new(),
        });
        let output = rasterizer.rasterize("<p>surat</p>").await.unwrap();
        assert_eq!(output, b"<p>surat</p>");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn it_reports_a_failing_command() {
        let rasterizer = CommandRasterizer::new(RasterizerConfig {
            program: "false".to_owned(),
            args: Vec::new(),
        });
        assert!(matches!(
            rasterizer.rasterize("<p>surat</p>").await,
            Err(RenderError::Rasterizer { .. })
        ));
        let missing = CommandRasterizer::new(RasterizerConfig {
            program: "arsip-no-such-rasterizer".to_owned(),
            args: Vec::new(),
        });
        assert!(matches!(
            missing.rasterize("x").await,
            Err(RenderError::Spawn { .. })
        ));
    }
}
