use crate::error::TranscriptError;
use crate::models::{ErrorResponse, Transcript};
use crate::utils::extract_youtube_video_id;
use crate::AppState;
use rocket::http::{ContentType, Header, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::{get, State};
use std::io::Cursor;

/// Plain-text transcript served as a `<video_id>.txt` download.
pub struct TranscriptDownload(pub Transcript);

impl<'r> Responder<'r, 'static> for TranscriptDownload {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let text = self.0.text();
        let disposition = format!("attachment; filename=\"{}\"", self.0.file_name());
        Response::build()
            .status(Status::Ok)
            .header(ContentType::Plain)
            .header(Header::new("Content-Disposition", disposition))
            .sized_body(text.len(), Cursor::new(text))
            .ok()
    }
}

#[get("/transcript?<video>&<lang>")]
pub async fn get_transcript(
    video: String,
    lang: Option<Vec<String>>,
    state: &State<AppState>,
) -> Result<TranscriptDownload, ErrorResponse> {
    let video_id = extract_youtube_video_id(&video).ok_or_else(|| ErrorResponse {
        status: Status::BadRequest,
        error: "invalid_video".to_string(),
        message: format!("Not a video id or URL: {video}"),
    })?;

    match state
        .session
        .transcript(&video_id, &lang.unwrap_or_default())
        .await
    {
        Ok(transcript) => Ok(TranscriptDownload(transcript)),
        Err(e @ TranscriptError::Unavailable { .. }) => Err(ErrorResponse {
            status: Status::NotFound,
            error: "transcript_unavailable".to_string(),
            message: e.to_string(),
        }),
    }
}
