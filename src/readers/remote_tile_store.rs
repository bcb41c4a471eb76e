//! Tiles hosted as cloud-optimized GeoTIFFs: `{base}/{code}cog{day}.tif`.

use crate::error::{MapError, Result};
use crate::models::{DayOffset, RasterTile, TileKey, Variable};
use crate::readers::geotiff::decode_tile;
use crate::readers::tile_store::TileStore;
use crate::utils::constants::TILE_EXTENSION;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::io::Cursor;
use std::time::Duration;

pub struct RemoteTileStore {
    base_url: String,
    variables: Vec<Variable>,
    client: Client,
}

impl RemoteTileStore {
    pub fn new(base_url: &str, variables: Vec<Variable>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MapError::Config(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            variables,
            client,
        })
    }

    pub fn serves(&self, variable: Variable) -> bool {
        self.variables.contains(&variable)
    }

    pub fn tile_url(&self, key: TileKey) -> String {
        format!(
            "{}/{}cog{}.{}",
            self.base_url,
            key.variable.code(),
            key.day,
            TILE_EXTENSION
        )
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let network = |reason: String| MapError::NetworkFetch {
            url: url.to_string(),
            reason,
        };

        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                network("timed out".to_string())
            } else {
                network(e.to_string())
            }
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(MapError::TileNotFound {
                tile: url.to_string(),
            }),
            status if !status.is_success() => Err(network(format!("HTTP {}", status))),
            _ => {
                let body = response.bytes().map_err(|e| network(e.to_string()))?;
                Ok(body.to_vec())
            }
        }
    }
}

impl TileStore for RemoteTileStore {
    fn resolve(&self, variable: Variable, day: DayOffset) -> Result<RasterTile> {
        let key = TileKey::new(variable, day);
        if !self.serves(variable) {
            return Err(MapError::TileNotFound {
                tile: format!("{} (not served remotely)", key),
            });
        }

        let url = self.tile_url(key);
        tracing::info!("Fetching {}", url);
        let bytes = self.fetch(&url)?;
        tracing::debug!("Fetched {} bytes from {}", bytes.len(), url);

        decode_tile(key, Cursor::new(bytes))
    }

    fn describe(&self) -> String {
        let codes: Vec<&str> = self.variables.iter().map(|v| v.code()).collect();
        format!("remote:{} [{}]", self.base_url, codes.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grid;
    use crate::readers::geotiff::write_tile;
    use crate::test_support::morocco_bounds;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one canned HTTP response on a random local port.
    fn serve_once(status_line: &'static str, body: Vec<u8>, delay: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 1024];
                let _ = stream.read(&mut request);
                thread::sleep(delay);
                let header = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status_line,
                    body.len()
                );
                let _ = stream.write_all(header.as_bytes());
                let _ = stream.write_all(&body);
            }
        });

        format!("http://{}/cog", addr)
    }

    fn humidity_store(base: &str, timeout: Duration) -> RemoteTileStore {
        RemoteTileStore::new(base, vec![Variable::Humidity], timeout).unwrap()
    }

    #[test]
    fn test_tile_url() {
        let store = humidity_store("https://example.org/cog/", Duration::from_secs(1));
        let key = TileKey::new(Variable::Humidity, DayOffset::new(-2).unwrap());
        assert_eq!(store.tile_url(key), "https://example.org/cog/humcog-2.tif");
    }

    #[test]
    fn test_unlisted_variable_is_not_found() {
        let store = humidity_store("http://127.0.0.1:9/cog", Duration::from_secs(1));
        let result = store.resolve(Variable::Precipitation, DayOffset::current());
        assert!(matches!(result, Err(MapError::TileNotFound { .. })));
    }

    #[test]
    fn test_fetches_and_decodes() {
        let grid = Grid::new(1, 2, vec![10.0, 40.0]).unwrap();
        let mut body = Cursor::new(Vec::new());
        write_tile(&mut body, &grid, &morocco_bounds()).unwrap();

        let base = serve_once("200 OK", body.into_inner(), Duration::ZERO);
        let store = humidity_store(&base, Duration::from_secs(5));

        let tile = store.resolve(Variable::Humidity, DayOffset::current()).unwrap();
        assert_eq!(tile.grid.get(0, 1), Some(40.0));
        assert_eq!(tile.bounds, morocco_bounds());
    }

    #[test]
    fn test_404_is_not_found() {
        let base = serve_once("404 Not Found", Vec::new(), Duration::ZERO);
        let store = humidity_store(&base, Duration::from_secs(5));

        let result = store.resolve(Variable::Humidity, DayOffset::new(-4).unwrap());
        assert!(matches!(result, Err(MapError::TileNotFound { .. })));
    }

    #[test]
    fn test_server_error_is_network_fetch() {
        let base = serve_once("503 Service Unavailable", Vec::new(), Duration::ZERO);
        let store = humidity_store(&base, Duration::from_secs(5));

        let result = store.resolve(Variable::Humidity, DayOffset::current());
        assert!(matches!(result, Err(MapError::NetworkFetch { .. })));
    }

    #[test]
    fn test_timeout_is_network_fetch() {
        let base = serve_once("200 OK", Vec::new(), Duration::from_secs(3));
        let store = humidity_store(&base, Duration::from_millis(300));

        let result = store.resolve(Variable::Humidity, DayOffset::current());
        assert!(matches!(result, Err(MapError::NetworkFetch { .. })));
    }
}
