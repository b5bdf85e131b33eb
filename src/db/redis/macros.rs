/// Serves a value from an optional cache, computing and storing it on a miss.
///
/// # Arguments
/// * `$cache`: an `Option<Cache>`. With `None` the block always runs.
/// * `$key`: the `CacheKey` to read and write.
/// * `$ttl`: time-to-live of a stored value, in seconds.
/// * `$block`: future computing the value; its error is propagated with `?`.
///
/// Errors are never cached, so a failed upstream call is retried on the next
/// request instead of being served from the cache.
///
/// # Example
/// ```rust,ignore
/// let genres: Vec<Genre> = cached!(self.cache, CacheKey::Genres(lang), GENRE_TTL, async move {
///     self.get_json("/genre/movie/list", &[]).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match &$cache {
            Some(cache) => cache.lookup(&key).await,
            None => None,
        };

        match hit {
            Some(value) => Ok(value),
            None => {
                let value = $block.await?;
                if let Some(cache) = &$cache {
                    cache.set_in_background(&key, &value, $ttl);
                }
                Ok(value)
            }
        }
    }};
}
