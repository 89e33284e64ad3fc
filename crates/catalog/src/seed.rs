//! Built-in sample catalog used when no catalog file is given.

use crate::types::Movie;

const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
const BACKDROP_BASE: &str = "https://image.tmdb.org/t/p/w1280";

fn sample(
    id: u32,
    title: &str,
    year: u16,
    rating: f32,
    image_path: &str,
    genres: &[&str],
    description: &str,
) -> Movie {
    Movie::new(id, title, year, rating)
        .with_poster(format!("{POSTER_BASE}{image_path}"))
        .with_backdrop(format!("{BACKDROP_BASE}{image_path}"))
        .with_genres(genres.iter().copied())
        .with_description(description)
        .with_runtime(120)
}

/// The ten sample movies the explorer ships with, in catalog order.
pub fn sample_movies() -> Vec<Movie> {
    vec![
        sample(
            1,
            "Inception",
            2010,
            8.8,
            "/9gk7adHYeDvHkCSEqAvQNLV5Uge.jpg",
            &["Action", "Sci-Fi", "Thriller"],
            "A thief who steals corporate secrets through dream-sharing technology.",
        ),
        sample(
            2,
            "The Shawshank Redemption",
            1994,
            9.3,
            "/q6y0Go1tsGEsmtFryDOJo3dEmqu.jpg",
            &["Drama"],
            "Two imprisoned men bond over a number of years.",
        ),
        sample(
            3,
            "The Dark Knight",
            2008,
            9.0,
            "/qJ2tW6WMUDux911r6m7haRef0WH.jpg",
            &["Action", "Crime", "Drama"],
            "Batman faces the Joker in Gotham City.",
        ),
        sample(
            4,
            "Parasite",
            2019,
            8.6,
            "/3h1JZJeh5zqTn2birTk6qOB2KzJ.jpg",
            &["Comedy", "Drama", "Thriller"],
            "A poor family schemes to become employed by a wealthy family.",
        ),
        sample(
            5,
            "Interstellar",
            2014,
            8.6,
            "/gEU2QniE6E77NI6lCU6MxlNBvIx.jpg",
            &["Adventure", "Drama", "Sci-Fi"],
            "A team of explorers travel through a wormhole in space.",
        ),
        sample(
            6,
            "The Godfather",
            1972,
            9.2,
            "/3bhkrj58Vtu7enYsRolD1fZdja1.jpg",
            &["Crime", "Drama"],
            "The aging patriarch of an organized crime dynasty transfers control.",
        ),
        sample(
            7,
            "Pulp Fiction",
            1994,
            8.9,
            "/d5iIlFn5s0ImszYzBPb8JPIfbXD.jpg",
            &["Crime", "Drama"],
            "The lives of two mob hitmen, a boxer, and a pair of diner bandits intertwine.",
        ),
        sample(
            8,
            "Fight Club",
            1999,
            8.8,
            "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
            &["Drama"],
            "An insomniac office worker forms an underground fight club.",
        ),
        sample(
            9,
            "Forrest Gump",
            1994,
            8.8,
            "/saHP97rTPS5eLmrLQEcANmKrsFl.jpg",
            &["Drama", "Romance"],
            "The presidencies of Kennedy and Johnson, Vietnam, and other events shape Forrest's life.",
        ),
        sample(
            10,
            "The Matrix",
            1999,
            8.7,
            "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
            &["Action", "Sci-Fi"],
            "A computer hacker learns about the true nature of reality.",
        ),
    ]
}
