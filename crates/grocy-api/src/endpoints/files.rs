use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::debug;

use crate::{Error, GrocyClient};

/// An upstream file download, passed through without interpretation.
#[derive(Debug, Clone)]
pub struct FileResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl GrocyClient {
    /// `GET /files/{picture_type}/{filename}?force_serve_as=picture&best_fit_width={width}`.
    ///
    /// Non-2xx replies are returned as-is rather than mapped to an error so
    /// a proxy can hand the same status back to its caller.
    pub async fn picture(
        &self,
        picture_type: &str,
        filename: &str,
        width: u32,
    ) -> Result<FileResponse, Error> {
        let mut url = self.url("files")?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(picture_type)
            .push(filename);
        url.query_pairs_mut()
            .append_pair("force_serve_as", "picture")
            .append_pair("best_fit_width", &width.to_string());
        debug!("GET {url}");

        let resp = self
            .http()
            .get(url)
            .header(ACCEPT, HeaderValue::from_static("*/*"))
            .send()
            .await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;
        Ok(FileResponse {
            status,
            headers,
            body,
        })
    }
}
