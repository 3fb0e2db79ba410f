#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::Mutex;

    use pawpal::advice::composer::{ask, FALLBACK_EMPTY, FALLBACK_ERROR};
    use pawpal::advice::models::{AdviceRequest, Citation, GeoPoint, ProviderReply, Source};
    use pawpal::advice::{AdviceError, AdviceProvider};
    use pawpal::profile::Profile;

    /// Deterministic stand-in for the external service. Records the last
    /// request it saw and replies from a canned script.
    struct MockProvider {
        reply: Result<ProviderReply, ()>,
        last_request: Mutex<Option<AdviceRequest>>,
    }

    impl MockProvider {
        fn replying(reply: ProviderReply) -> Self {
            Self {
                reply: Ok(reply),
                last_request: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                last_request: Mutex::new(None),
            }
        }

        fn last(&self) -> AdviceRequest {
            self.last_request.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait]
    impl AdviceProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn generate(&self, request: &AdviceRequest) -> Result<ProviderReply, AdviceError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            match &self.reply {
                Ok(r) => Ok(r.clone()),
                Err(_) => Err(AdviceError::Network("connection refused".to_string())),
            }
        }
    }

    fn web_reply() -> ProviderReply {
        ProviderReply {
            text: "Feed smaller meals twice a day.".to_string(),
            citations: vec![
                Citation::Web(Source {
                    title: "Feeding basics".to_string(),
                    uri: "https://example.com/feeding".to_string(),
                }),
                Citation::Place(Source {
                    title: "Lakeside Vet".to_string(),
                    uri: "https://maps.example.com/lakeside".to_string(),
                }),
            ],
        }
    }

    #[tokio::test]
    async fn outbound_request_omits_location_when_absent() {
        let provider = MockProvider::replying(web_reply());

        ask(&provider, "where is a good dog park?", &[], None, None).await;
        assert!(provider.last().location.is_none());

        let point = GeoPoint { lat: 44.9778, lng: -93.2650 };
        ask(&provider, "where is a good dog park?", &[], Some(point), None).await;
        assert_eq!(provider.last().location, Some(point));
    }

    #[tokio::test]
    async fn citations_normalize_to_flat_sources() {
        let provider = MockProvider::replying(web_reply());
        let advice = ask(&provider, "how much should I feed?", &[], None, None).await;

        assert_eq!(advice.text, "Feed smaller meals twice a day.");
        // Web and location variants land in the same normalized shape.
        assert_eq!(advice.sources.len(), 2);
        assert_eq!(advice.sources[0].title, "Feeding basics");
        assert_eq!(advice.sources[1].title, "Lakeside Vet");
    }

    #[tokio::test]
    async fn empty_answer_gets_fallback_text() {
        let provider = MockProvider::replying(ProviderReply {
            text: "   ".to_string(),
            citations: vec![],
        });
        let advice = ask(&provider, "hello?", &[], None, None).await;
        assert_eq!(advice.text, FALLBACK_EMPTY);
    }

    #[tokio::test]
    async fn provider_failure_is_absorbed_into_fallback() {
        let provider = MockProvider::failing();
        let advice = ask(&provider, "anything", &[], None, None).await;

        assert_eq!(advice.text, FALLBACK_ERROR);
        assert!(advice.sources.is_empty());
    }

    #[tokio::test]
    async fn identical_inputs_yield_identical_output() {
        let provider = MockProvider::replying(web_reply());
        let profile = Profile {
            name: "Rex".to_string(),
            breed: "Labrador".to_string(),
            ..Default::default()
        };
        let point = GeoPoint { lat: 1.0, lng: 2.0 };

        let first = ask(&provider, "same question", &[], Some(point), Some(&profile)).await;
        let request_one = provider.last();
        let second = ask(&provider, "same question", &[], Some(point), Some(&profile)).await;
        let request_two = provider.last();

        assert_eq!(first, second);
        assert_eq!(request_one, request_two);
    }
}
