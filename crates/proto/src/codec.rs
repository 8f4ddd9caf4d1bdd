//! Newline-delimited JSON framing over async byte streams.
//!
//! The concrete transport (worker boundary, pipe, socket) is whatever the
//! embedder hands in as `AsyncBufRead`/`AsyncWrite` halves; one frame per
//! line keeps the protocol inspectable and the framing trivial.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ProtoError, Result};

/// Reads one frame from the input stream.
///
/// Returns `Ok(None)` on clean EOF. Blank lines between frames are
/// tolerated and skipped.
pub async fn read_frame<F, R>(input: &mut R) -> Result<Option<F>>
where
	F: DeserializeOwned,
	R: AsyncBufRead + Unpin,
{
	loop {
		let mut line = String::new();
		let read = input.read_line(&mut line).await?;
		if read == 0 {
			return Ok(None);
		}
		let trimmed = line.trim();
		if trimmed.is_empty() {
			continue;
		}
		return serde_json::from_str(trimmed)
			.map(Some)
			.map_err(|error| ProtoError::Decode { error });
	}
}

/// Writes one frame to the output stream and flushes it.
pub async fn write_frame<F, W>(output: &mut W, frame: &F) -> Result<()>
where
	F: Serialize,
	W: AsyncWrite + Unpin,
{
	let mut buf = serde_json::to_vec(frame).map_err(|error| ProtoError::Encode { error })?;
	buf.push(b'\n');
	output.write_all(&buf).await?;
	output.flush().await?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::types::{ExtToMain, MainToExt, RequestId, SettingsEdit, WireResult, WireRoot};

	#[tokio::test]
	async fn frames_round_trip_through_a_byte_stream() {
		let frames = vec![
			MainToExt::SyncRoots {
				roots: vec![WireRoot {
					uri: "git://github.com/quarry-dev/quarry?rev".into(),
					extra: serde_json::Map::new(),
				}],
			},
			MainToExt::SyncVersionContext { ctx: Some("3.17".into()) },
			MainToExt::TransformQuery {
				id: RequestId(4),
				query: "repo:quarry err".into(),
			},
		];

		let mut wire = Vec::new();
		for frame in &frames {
			write_frame(&mut wire, frame).await.unwrap();
		}

		let mut input = wire.as_slice();
		let mut decoded = Vec::new();
		while let Some(frame) = read_frame::<MainToExt, _>(&mut input).await.unwrap() {
			decoded.push(frame);
		}
		assert_eq!(decoded, frames);
	}

	#[tokio::test]
	async fn blank_lines_between_frames_are_skipped() {
		let mut wire = Vec::new();
		let frame = ExtToMain::ApplySettingsEdit {
			id: RequestId(0),
			edit: SettingsEdit {
				path: vec![],
				value: json!(null),
			},
		};
		wire.extend_from_slice(b"\n\n");
		write_frame(&mut wire, &frame).await.unwrap();

		let mut input = wire.as_slice();
		let decoded: Option<ExtToMain> = read_frame(&mut input).await.unwrap();
		assert_eq!(decoded, Some(frame));
		assert!(read_frame::<ExtToMain, _>(&mut input).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn malformed_line_is_a_decode_error_not_a_panic() {
		let mut input: &[u8] = b"this is not a frame\n";
		let result = read_frame::<MainToExt, _>(&mut input).await;
		assert!(matches!(result, Err(ProtoError::Decode { .. })));
	}

	#[tokio::test]
	async fn response_frame_carries_remote_errors_verbatim() {
		let frame = ExtToMain::Response {
			id: RequestId(9),
			result: WireResult::Err("command not found: search.export".into()),
		};
		let mut wire = Vec::new();
		write_frame(&mut wire, &frame).await.unwrap();

		let mut input = wire.as_slice();
		let decoded: Option<ExtToMain> = read_frame(&mut input).await.unwrap();
		assert_eq!(decoded, Some(frame));
	}
}
