//! Upstream response fixtures for "The Matrix"

pub const TMDB_DETAILS: &str = r#"{
    "id": 603,
    "title": "The Matrix",
    "release_date": "1999-03-30",
    "overview": "Set in the 22nd century, The Matrix tells the story of a computer hacker.",
    "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
    "vote_average": 8.217,
    "videos": {"results": [
        {"site": "YouTube", "type": "Featurette", "key": "feat1"},
        {"site": "YouTube", "type": "Trailer", "key": "vKQi3bBA1y8"}
    ]}
}"#;

pub const TMDB_EXTERNAL_IDS: &str = r#"{
    "id": 603,
    "title": "The Matrix",
    "external_ids": {"imdb_id": "tt0133093"}
}"#;

pub const TMDB_SEARCH: &str = r#"{"page": 1, "results": [
    {"id": 603, "title": "The Matrix", "release_date": "1999-03-30", "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg"},
    {"id": 604, "title": "The Matrix Reloaded", "release_date": "2003-05-15", "poster_path": null}
]}"#;

pub const TMDB_SEARCH_EMPTY: &str = r#"{"page": 1, "results": []}"#;

pub const IMDB_PAGE: &str = r#"<html><head><title>The Matrix (1999) - IMDb</title></head><body>
<div data-testid="hero-rating-bar__aggregate-rating__score"><span>8.7</span><span>/10</span></div>
</body></html>"#;

pub const OMDB_RESPONSE: &str = r#"{"Title": "The Matrix", "Response": "True", "Ratings": [
    {"Source": "Internet Movie Database", "Value": "8.7/10"},
    {"Source": "Rotten Tomatoes", "Value": "83%"},
    {"Source": "Metacritic", "Value": "73/100"}
]}"#;

pub const LETTERBOXD_PAGE: &str = r#"<html><head>
<meta name="twitter:data2" content="4.18 out of 5">
</head><body>
<a href="/film/the-matrix/ratings/" class="tooltip display-rating">4.2</a>
</body></html>"#;
