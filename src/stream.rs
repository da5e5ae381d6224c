// Copyright 2020 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A stream of resources.

use async_stream::try_stream;
use futures::stream::Stream;

use super::{Error, PaginatedResource, Pager};

impl<T: PaginatedResource> Pager<T> {
    /// Turn the pager into a stream of resources.
    ///
    /// Pages are requested as the stream is polled.
    ///
    /// ```rust,no_run
    /// # async fn example() -> Result<(), osclient::Error> {
    /// use futures::pin_mut;
    /// use futures::stream::TryStreamExt;
    ///
    /// let client = osclient::from_env().await?;
    /// let network = osclient::ServiceClient::new(client, osclient::services::NETWORK)?;
    /// let ports = osclient::networking::ports::list(&network, Default::default())?
    ///     .into_stream();
    /// pin_mut!(ports);
    /// while let Some(port) = ports.try_next().await? {
    ///     println!("ID = {}", port.id);
    /// }
    /// # Ok(()) }
    /// ```
    pub fn into_stream(self) -> impl Stream<Item = Result<T, Error>> {
        try_stream! {
            let mut next = Some(self.url().clone());
            while let Some(url) = next.take() {
                let (_, items, following) = self.fetch_page(url).await?;
                next = following;
                for item in items {
                    yield item;
                }
            }
        }
    }
}
