use std::fs;
use std::path::Path;
use titles_eda::workflow::{self, summary_csv_name};
use titles_eda::WorkflowConfig;

const TITLES: &str = "\
show_id,type,title,director,cast,country,date_added,release_year,rating,duration,listed_in,description
s1,Movie,Dick Johnson Is Dead,Kirsten Johnson,,United States,\"September 25, 2021\",2020,PG-13,90 min,Documentaries,\"As her father nears the end of his life, a filmmaker stages his death in wonderful ways.\"
s2,TV Show,Blood & Water,,Ama Qamata,South Africa,\"September 24, 2021\",2021,TV-MA,2 Seasons,International TV Shows,\"After crossing paths at a party, a teen suspects a brutal crime.\"
s3,Movie,My Little Pony,Robert Cullen,Vanessa Hudgens,,\"September 24, 2021\",2021,PG,91 min,Children & Family Movies,\"Equestria's divided. But a bright-eyed hero believes friendly ponies can be happy again.\"
s4,Movie,Sankofa,Haile Gerima,Kofi Ghanaba,United States,\"September 24, 2021\",1993,TV-MA,125 min,Dramas,\"On a photo shoot in Ghana, a model is transported back to the dark days of slavery.\"
s5,TV Show,Kota Factory,,Mayur More,India,\"September 24, 2021\",2021,TV-MA,2 Seasons,International TV Shows,\"In a city of coaching centers, students chase a dream.\"
s6,Movie,The Starling,Theodore Melfi,Melissa McCarthy,United States,\"September 24, 2021\",2021,PG-13,104 min,Comedies,\"A woman adjusting to life after a loss contends with a feisty bird.\"
s7,Movie,Jeans,S. Shankar,Aishwarya Rai Bachchan,India,\"September 21, 2021\",1998,TV-14,166 min,Comedies,\"A father's perfect plan for his twin sons is not good for anyone.\"
s8,Movie,Grown Ups,Dennis Dugan,Adam Sandler,United States,\"September 20, 2021\",2010,PG-13,,Comedies,\"Mourning the loss of their coach, childhood friends reunite.\"
s9,Movie,Dark Skies,Scott Stewart,Keri Russell,United States,\"September 19, 2021\",2013,PG-13,97 min,Horror Movies,\"A family faces a sinister, deadly force.\"
s10,Movie,Paranoia,Robert Luketic,Liam Hemsworth,India,\"September 19, 2021\",2013,,106 min,Thrillers,\"A young employee is caught in a dangerous game.\"
";

fn setup(root: &Path) -> WorkflowConfig {
    fs::write(root.join("netflix_titles.csv"), TITLES).unwrap();
    fs::create_dir(root.join("graphs")).unwrap();
    fs::create_dir(root.join("csv_files")).unwrap();

    WorkflowConfig {
        input: root.join("netflix_titles.csv"),
        cleaned_export: root.join("netflix_titles_cleaned.csv"),
        graphs_dir: root.join("graphs"),
        csv_dir: root.join("csv_files"),
        ..WorkflowConfig::default()
    }
}

#[test]
fn workflow_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());

    let artifacts = workflow::run(&config).unwrap();

    assert_eq!(artifacts.len(), 19);
    for path in &artifacts {
        assert!(path.is_file(), "missing artifact {}", path.display());
    }

    let graphs = dir.path().join("graphs");
    for name in [
        "sum_of_nulls_in_columns",
        "netflix_content_ratings",
        "movies_vrs_series",
        "content_prod_trend",
        "content_sentiment",
        "dist_plot_of_movie_rating_vrs_duration",
        "dist_plot_of_movie_durations_vrs_countries",
        "dist_plot_of_movie_released-yr_vrs_countries",
    ] {
        let svg = fs::read_to_string(graphs.join(format!("{}.svg", name))).unwrap();
        assert!(svg.contains("<svg"), "{} is not an SVG", name);
    }

    let csv_dir = dir.path().join("csv_files");
    for name in [
        "netflix_content_ratings.csv",
        "content_prod_trend.csv",
        "content_sentiment.csv",
    ] {
        assert!(csv_dir.join(name).is_file(), "missing {}", name);
    }
}

#[test]
fn cleaned_export_has_no_empty_cells() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());

    workflow::run(&config).unwrap();
    let cleaned = fs::read_to_string(&config.cleaned_export).unwrap();

    assert!(cleaned.starts_with("show_id,"));
    assert!(cleaned.contains("No item specified"));
    assert_eq!(cleaned.lines().count(), 11);
}

#[test]
fn summary_tables_have_expected_layout() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());

    workflow::run(&config).unwrap();

    let by_type =
        fs::read_to_string(config.csv_dir.join(summary_csv_name("type", "duration"))).unwrap();
    let lines: Vec<&str> = by_type.lines().collect();
    assert!(lines[0].ends_with(",type,mean duration,std,median"));
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("0,Movie,1.0,"));

    let sentiment = fs::read_to_string(config.csv_dir.join("content_sentiment.csv")).unwrap();
    assert!(sentiment
        .lines()
        .next()
        .unwrap()
        .ends_with(",release_year,Sentiment,total_content"));
}

#[test]
fn rerun_produces_identical_tables() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    let summary = config.csv_dir.join(summary_csv_name("country", "duration"));

    workflow::run(&config).unwrap();
    let first = fs::read(&summary).unwrap();
    workflow::run(&config).unwrap();
    let second = fs::read(&summary).unwrap();

    assert_eq!(first, second);
}

#[test]
fn missing_dataset_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = WorkflowConfig {
        input: dir.path().join("absent.csv"),
        ..WorkflowConfig::default()
    };

    assert!(workflow::run(&config).is_err());
}

#[test]
fn missing_graphs_directory_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(dir.path());
    config.graphs_dir = dir.path().join("absent");

    assert!(workflow::run(&config).is_err());
    assert!(!dir.path().join("absent").exists());
}
