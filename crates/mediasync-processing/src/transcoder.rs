//! FFmpeg transcoding behind a narrow trait, so the pipeline can be tested
//! without a real binary.

use crate::planner::CompressionPlan;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {code:?}: {stderr}")]
    ToolFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transcoding collaborator. Replaces `input` in place with the downscaled
/// rendition; on error the original file must be left intact so the caller
/// can still upload it.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, input: &Path, plan: &CompressionPlan) -> Result<(), TranscodeError>;
}

/// Invokes the external ffmpeg binary with a scale filter parameterized by
/// the plan's factor (both dimensions rounded down to the nearest even
/// integer for codec compatibility), a fixed 30 fps output, libx264, and the
/// `slow` preset.
pub struct FfmpegTranscoder {
    ffmpeg_path: String,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: String) -> Self {
        FfmpegTranscoder { ffmpeg_path }
    }

    fn scale_filter(scale_factor: f64) -> String {
        format!(
            "scale=trunc(iw*{s:.2}/2)*2:trunc(ih*{s:.2}/2)*2,fps=30",
            s = scale_factor
        )
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, plan: &CompressionPlan) -> Result<(), TranscodeError> {
        // ffmpeg cannot read and write the same file, so move the original
        // aside and render back to the scratch path. The original is restored
        // on any failure.
        let staging = input.with_file_name(format!(
            "{}.src",
            input
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("scratch")
        ));
        tokio::fs::rename(input, &staging).await?;

        let filter = Self::scale_filter(plan.scale_factor);
        tracing::info!(
            scale_factor = plan.scale_factor,
            filter = %filter,
            input = %input.display(),
            "Running ffmpeg compression"
        );

        let output = Command::new(&self.ffmpeg_path)
            .arg("-y")
            .arg("-i")
            .arg(&staging)
            .arg("-vf")
            .arg(&filter)
            .arg("-c:v")
            .arg("libx264")
            .arg("-preset")
            .arg("slow")
            .arg(input)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Err(source) => {
                restore(&staging, input).await;
                Err(TranscodeError::Spawn {
                    tool: self.ffmpeg_path.clone(),
                    source,
                })
            }
            Ok(out) if !out.status.success() => {
                let stderr = String::from_utf8_lossy(&out.stderr).into_owned();
                restore(&staging, input).await;
                Err(TranscodeError::ToolFailed {
                    tool: self.ffmpeg_path.clone(),
                    code: out.status.code(),
                    stderr,
                })
            }
            Ok(_) => {
                if let Err(e) = tokio::fs::remove_file(&staging).await {
                    tracing::warn!(
                        path = %staging.display(),
                        error = %e,
                        "Failed to remove transcode staging file"
                    );
                }
                Ok(())
            }
        }
    }
}

/// Put the untouched original back at the scratch path, discarding whatever
/// partial output ffmpeg may have produced.
async fn restore(staging: &Path, input: &Path) {
    let _ = tokio::fs::remove_file(input).await;
    if let Err(e) = tokio::fs::rename(staging, input).await {
        tracing::error!(
            staging = %staging.display(),
            input = %input.display(),
            error = %e,
            "Failed to restore original file after transcode failure"
        );
    }
}
