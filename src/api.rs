use async_trait::async_trait;
use log::{ debug, info };
use std::time::Duration;
use url::Url;

use crate::error::{ ClientError, Result };
use crate::models::chat::DeleteResponse;

/// REST operations the controller needs from the chat backend.
#[async_trait]
pub trait ConversationApi: Send + Sync {
    async fn delete_conversation(&self, conversation_id: &str) -> Result<DeleteResponse>;
}

pub struct RestClient {
    client: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        info!("REST API base URL: {}", base_url);
        Ok(Self { client, base_url })
    }

    fn conversation_url(&self, conversation_id: &str) -> Result<Url> {
        let mut url = self.base_url.join("api/conversation/")?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(conversation_id);
        Ok(url)
    }
}

#[async_trait]
impl ConversationApi for RestClient {
    async fn delete_conversation(&self, conversation_id: &str) -> Result<DeleteResponse> {
        let url = self.conversation_url(conversation_id)?;
        debug!("DELETE {}", url);

        let response = self.client.delete(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                path: url.path().to_string(),
            });
        }
        Ok(response.json::<DeleteResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_url_escapes_the_id() {
        let client = RestClient::new("http://localhost:5000", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.conversation_url("conv_1").unwrap().as_str(),
            "http://localhost:5000/api/conversation/conv_1"
        );
        assert_eq!(
            client.conversation_url("a/b c").unwrap().as_str(),
            "http://localhost:5000/api/conversation/a%2Fb%20c"
        );
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let client = RestClient::new("http://example.com/chat", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.conversation_url("c9").unwrap().as_str(),
            "http://example.com/chat/api/conversation/c9"
        );
    }

    #[test]
    fn invalid_base_url_is_an_error() {
        assert!(matches!(RestClient::new("not a url", Duration::from_secs(1)), Err(ClientError::Url(_))));
    }
}
