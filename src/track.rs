use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A track as returned by the node's `loadtracks` endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Track {
    /// Base64 blob the node uses to identify the track.
    #[serde(rename = "track")]
    pub track_id: String,
    pub info: TrackInfo,
    /// Set for tracks built from Spotify metadata; those have no `track_id`
    /// until they are resolved on the node.
    #[serde(skip)]
    pub spotify: Option<SpotifyTrack>,
    /// Playable track a Spotify track was resolved to.
    #[serde(skip)]
    pub resolved: Option<Box<Track>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    pub identifier: String,
    pub title: String,
    pub author: String,
    /// Length in milliseconds
    pub length: u64,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub is_stream: bool,
    #[serde(default)]
    pub is_seekable: bool,
    #[serde(default)]
    pub position: u64,
    #[serde(default)]
    pub source_name: Option<String>,
}

impl Track {
    pub fn length(&self) -> u64 {
        self.info.length
    }

    pub fn title(&self) -> &str {
        &self.info.title
    }

    pub fn is_spotify(&self) -> bool {
        self.spotify.is_some()
    }

    /// Query handed to the node to find a playable match for a Spotify track.
    pub fn search_query(&self) -> Option<String> {
        self.spotify
            .as_ref()
            .map(|s| format!("ytsearch:{} - {}", s.artists, s.name))
    }
}

impl From<SpotifyTrack> for Track {
    fn from(spotify: SpotifyTrack) -> Self {
        Track {
            track_id: String::new(),
            info: TrackInfo {
                identifier: spotify.id.clone(),
                title: spotify.name.clone(),
                author: spotify.artists.clone(),
                length: spotify.length,
                uri: spotify.uri.clone(),
                is_stream: false,
                is_seekable: true,
                position: 0,
                source_name: Some("spotify".to_owned()),
            },
            spotify: Some(spotify),
            resolved: None,
        }
    }
}

/// Track metadata taken from the Spotify Web API.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotifyTrack {
    pub name: String,
    pub artists: String,
    /// Length in milliseconds
    pub length: u64,
    pub id: String,
    pub isrc: Option<String>,
    pub image: Option<String>,
    /// `None` for local files
    pub uri: Option<String>,
}

#[derive(Deserialize)]
struct RawSpotifyTrack {
    name: String,
    artists: Vec<RawSpotifyArtist>,
    duration_ms: u64,
    id: String,
    #[serde(default)]
    external_ids: Option<RawExternalIds>,
    #[serde(default)]
    album: Option<RawAlbum>,
    #[serde(default)]
    is_local: bool,
    #[serde(default)]
    external_urls: Option<RawExternalUrls>,
}

#[derive(Deserialize)]
struct RawSpotifyArtist {
    name: String,
}

#[derive(Deserialize)]
struct RawExternalIds {
    isrc: Option<String>,
}

#[derive(Deserialize)]
struct RawAlbum {
    #[serde(default)]
    images: Vec<RawImage>,
}

#[derive(Deserialize)]
struct RawImage {
    url: String,
}

#[derive(Deserialize)]
struct RawExternalUrls {
    spotify: Option<String>,
}

impl SpotifyTrack {
    /// Builds a track from a Spotify API track object. `image` is used when
    /// the album carries no artwork, which is the case for playlist items.
    pub fn from_api(data: Value, image: Option<String>) -> serde_json::Result<Self> {
        let raw: RawSpotifyTrack = serde_json::from_value(data)?;

        let artists = raw
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let image = raw
            .album
            .and_then(|album| album.images.into_iter().next())
            .map(|img| img.url)
            .or(image);

        let uri = if raw.is_local {
            None
        } else {
            raw.external_urls.and_then(|urls| urls.spotify)
        };

        Ok(SpotifyTrack {
            name: raw.name,
            artists,
            length: raw.duration_ms,
            id: raw.id,
            isrc: raw.external_ids.and_then(|ids| ids.isrc),
            image,
            uri,
        })
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadType {
    TrackLoaded,
    PlaylistLoaded,
    SearchResult,
    NoMatches,
    LoadFailed,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistInfo {
    pub name: Option<String>,
    pub selected_track: Option<i64>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LoadException {
    pub message: Option<String>,
    pub severity: Option<String>,
}

/// Body of a `loadtracks` response.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoadResult {
    pub load_type: LoadType,
    #[serde(default)]
    pub playlist_info: PlaylistInfo,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub exception: Option<LoadException>,
}
