//! Sequential day-by-day page stream.

use chrono::NaiveDate;
use futures::stream::{self, Stream};
use log::debug;
use oxtap_types::{PageToken, RateRow, TapError};

use crate::{
    ApiClient, DatePaginator, flatten,
    url::{RequestBuilder, RequestContext},
};

/// The rows of one day's snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// The token this page was requested with.
    pub token: PageToken,
    /// Snapshot date reported by the API.
    pub date: NaiveDate,
    /// Flattened rows.
    pub rows: Vec<RateRow>,
}

impl Page {
    /// Returns true if the page has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows in the page.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Pagination cursor carried between pages.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    next: Option<PageToken>,
    previous: Option<PageToken>,
}

/// Creates an async stream of pages, one per day, starting at the bookmark
/// (or configured start date) and ending the day before `paginator.today()`.
///
/// Pages are fetched strictly one after another: the next day is only known
/// once the current page has been parsed. Nothing is requested when the
/// starting day is not yet available.
///
/// The stream ends with an error on the first failed page. A
/// [`TapError::PaginationLoop`] is raised if a response would make the same
/// day (or an earlier one) be requested again.
pub fn page_stream<'a>(
    client: &'a ApiClient,
    builder: &'a RequestBuilder,
    paginator: DatePaginator,
    context: RequestContext,
) -> impl Stream<Item = Result<Page, TapError>> + 'a {
    let first = builder.start_token(&context);
    let cursor = Cursor {
        next: paginator.is_available(&first).then_some(first),
        previous: None,
    };

    if cursor.next.is_none() {
        debug!("Start date {first} is not before {}, nothing to fetch", paginator.today());
    }

    stream::try_unfold(cursor, move |cursor| {
        let context = context.clone();
        async move {
            let Some(token) = cursor.next else {
                return Ok(None);
            };

            if let Some(previous) = cursor.previous.filter(|previous| token <= *previous) {
                return Err(TapError::PaginationLoop {
                    previous,
                    next: token,
                });
            }

            let (page, next) = fetch_page(client, builder, &paginator, &context, token).await?;
            let cursor = Cursor {
                next,
                previous: Some(token),
            };
            Ok(Some((page, cursor)))
        }
    })
}

/// Fetches and flattens one page, returning it with the token for the next one.
async fn fetch_page(
    client: &ApiClient,
    builder: &RequestBuilder,
    paginator: &DatePaginator,
    context: &RequestContext,
    token: PageToken,
) -> Result<(Page, Option<PageToken>), TapError> {
    let request = builder.build_request(context, Some(&token))?;
    debug!("GET {}", request.redacted_url());

    let body = client
        .get_json(&request)
        .await
        .map_err(|e| TapError::Http(e.to_string()))?;

    let rows = flatten(&body)?;
    let date = rows.date();
    let rows: Vec<RateRow> = rows.collect();
    let next = paginator.next_token(&body);

    debug!(
        "Page {token}: {} rates for {date}, next page {}",
        rows.len(),
        next.map_or_else(|| "none".to_string(), |t| t.to_string())
    );

    Ok((Page { token, date, rows }, next))
}
