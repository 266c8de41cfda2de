use crate::error::ProviderError;
use crate::models::{ListedVideo, Page, SearchQuery};
use crate::services::provider::{VideoProvider, MAX_PAGE_SIZE};
use log::{debug, info};
use std::future::Future;

/// Drive a cursor-based list endpoint until it runs out of pages or `cap` items
/// have been collected.
///
/// `list_page` receives the continuation cursor (`None` first) and the number of
/// items to ask for, which never exceeds `page_size` or what is left under `cap`.
pub async fn paginate<T, F, Fut>(
    mut list_page: F,
    page_size: u32,
    cap: Option<usize>,
) -> Result<Vec<T>, ProviderError>
where
    F: FnMut(Option<String>, u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, ProviderError>>,
{
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let mut items = Vec::new();
    let mut next_page_token: Option<String> = None;
    let mut pages = 0;

    loop {
        let wanted = match cap {
            Some(cap) if items.len() >= cap => break,
            Some(cap) => page_size.min(u32::try_from(cap - items.len()).unwrap_or(page_size)),
            None => page_size,
        };

        let page = list_page(next_page_token.take(), wanted).await?;
        pages += 1;
        debug!("Page {pages}: {} items", page.items.len());
        let empty = page.items.is_empty();
        items.extend(page.items);

        match page.next_page_token {
            Some(_) if empty => {
                debug!("Page {pages} was empty but carried a cursor, stopping");
                break;
            }
            Some(token) => next_page_token = Some(token),
            None => break, // No more pages
        }
    }

    if let Some(cap) = cap {
        items.truncate(cap);
    }
    Ok(items)
}

/// Every upload of a channel, newest first as the provider orders them.
pub async fn fetch_channel_uploads(
    provider: &dyn VideoProvider,
    channel_id: &str,
    cap: Option<usize>,
) -> Result<Vec<ListedVideo>, ProviderError> {
    let playlist_id = provider.uploads_playlist_id(channel_id).await?;
    let playlist_id = playlist_id.as_str();

    let uploads = paginate(
        |token, max_results| provider.list_playlist_items(playlist_id, token, max_results),
        MAX_PAGE_SIZE,
        cap,
    )
    .await?;

    info!(
        "Found {} videos in uploads playlist {playlist_id} of channel {channel_id}",
        uploads.len()
    );
    Ok(uploads)
}

pub async fn fetch_search_results(
    provider: &dyn VideoProvider,
    query: &SearchQuery,
    cap: Option<usize>,
) -> Result<Vec<ListedVideo>, ProviderError> {
    let results = paginate(
        |token, max_results| provider.search_videos(query, token, max_results),
        MAX_PAGE_SIZE,
        cap,
    )
    .await?;

    info!("Search for '{}' returned {} videos", query.keyword, results.len());
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{listed, FakeProvider, FAKE_CHANNEL};
    use std::cell::RefCell;

    fn ids(count: usize) -> Vec<ListedVideo> {
        (0..count).map(|i| listed(&format!("vid{i:08}"))).collect()
    }

    #[tokio::test]
    async fn concatenates_pages_in_order() {
        let pages = vec![
            Page {
                items: vec![1, 2, 3],
                next_page_token: Some("a".to_string()),
            },
            Page {
                items: vec![4, 5],
                next_page_token: Some("b".to_string()),
            },
            Page {
                items: vec![6],
                next_page_token: None,
            },
        ];
        let tokens = RefCell::new(Vec::new());
        let remaining = RefCell::new(pages.into_iter());

        let items = paginate(
            |token, _| {
                tokens.borrow_mut().push(token);
                let page = remaining.borrow_mut().next();
                async move { page.ok_or_else(|| ProviderError::Transient("overrun".into())) }
            },
            50,
            None,
        )
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(
            tokens.into_inner(),
            vec![None, Some("a".to_string()), Some("b".to_string())]
        );
    }

    #[tokio::test]
    async fn tolerates_empty_final_page() {
        let remaining = RefCell::new(
            vec![
                Page {
                    items: vec!["x"],
                    next_page_token: Some("next".to_string()),
                },
                Page {
                    items: vec![],
                    next_page_token: None,
                },
            ]
            .into_iter(),
        );

        let items = paginate(
            |_, _| {
                let page = remaining.borrow_mut().next();
                async move { page.ok_or_else(|| ProviderError::Transient("overrun".into())) }
            },
            50,
            None,
        )
        .await
        .unwrap();

        assert_eq!(items, vec!["x"]);
    }

    #[tokio::test]
    async fn empty_page_with_a_cursor_ends_the_walk() {
        let calls = RefCell::new(0);

        let items = paginate(
            |_, _| {
                *calls.borrow_mut() += 1;
                let page = if *calls.borrow() == 1 {
                    Page {
                        items: vec![1, 2],
                        next_page_token: Some("more".to_string()),
                    }
                } else {
                    Page {
                        items: vec![],
                        next_page_token: Some("still-more".to_string()),
                    }
                };
                async move { Ok::<_, ProviderError>(page) }
            },
            50,
            Some(100),
        )
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2]);
        assert_eq!(calls.into_inner(), 2);
    }

    #[tokio::test]
    async fn walks_a_whole_playlist_in_pages_of_fifty() {
        let fake = FakeProvider::new()
            .with_channel(FAKE_CHANNEL, "UUfake", 10)
            .with_uploads("UUfake", ids(120));

        let uploads = fetch_channel_uploads(&fake, FAKE_CHANNEL, None).await.unwrap();

        assert_eq!(uploads, ids(120));
        assert_eq!(fake.calls("list_playlist_items"), 3);
        assert_eq!(fake.page_sizes(), vec![50, 50, 50]);
    }

    #[tokio::test]
    async fn stops_at_the_cap() {
        let fake = FakeProvider::new()
            .with_channel(FAKE_CHANNEL, "UUfake", 10)
            .with_uploads("UUfake", ids(120));

        let uploads = fetch_channel_uploads(&fake, FAKE_CHANNEL, Some(60)).await.unwrap();

        assert_eq!(uploads, ids(60));
        assert_eq!(fake.page_sizes(), vec![50, 10]);
    }

    #[tokio::test]
    async fn zero_cap_makes_no_requests() {
        let fake = FakeProvider::new().with_search_results(ids(5));
        let query = SearchQuery {
            keyword: "rust".to_string(),
            region_code: None,
            duration: Default::default(),
            published_after: None,
            published_before: None,
            order: Default::default(),
        };

        let results = fetch_search_results(&fake, &query, Some(0)).await.unwrap();

        assert!(results.is_empty());
        assert_eq!(fake.calls("search_videos"), 0);
    }

    #[tokio::test]
    async fn provider_errors_abort() {
        let fake = FakeProvider::new()
            .failing_with(ProviderError::QuotaExceeded("daily limit".into()));
        assert_eq!(
            fetch_channel_uploads(&fake, FAKE_CHANNEL, None).await,
            Err(ProviderError::QuotaExceeded("daily limit".into()))
        );
    }
}
