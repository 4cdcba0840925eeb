use super::*;
use shared::domain::ProblemId;

fn problem(id: i64, title: &str, difficulty: &str, platform: &str) -> Problem {
    Problem {
        id: ProblemId(id),
        title: title.to_string(),
        description: None,
        difficulty: difficulty.to_string(),
        platform: platform.to_string(),
        url: None,
        last_reviewed: None,
        next_review: None,
        review_count: None,
        notes: None,
    }
}

fn ids(visible: &[&Problem]) -> Vec<i64> {
    visible.iter().map(|problem| problem.id.0).collect()
}

fn sample() -> Vec<Problem> {
    let mut two_sum = problem(1, "Two Sum", "Easy", "LeetCode");
    two_sum.description = Some("Find two numbers adding to target".into());
    two_sum.review_count = Some(3);
    two_sum.next_review = Some("2024-03-01".into());

    let mut graph = problem(2, "graph coloring", "Hard", "Codeforces");
    graph.notes = Some("Use BFS on the complement".into());
    graph.review_count = Some(7);

    let mut lru = problem(3, "LRU Cache", "Medium", "LeetCode");
    lru.review_count = Some(3);
    lru.next_review = Some("2024-01-15".into());

    let mut apple = problem(4, "apple division", "easy", "CSES");
    apple.next_review = Some("not a date".into());

    vec![two_sum, graph, lru, apple]
}

#[test]
fn default_state_shows_newest_first() {
    let problems = sample();
    let visible = derive(&problems, &FilterState::default());
    assert_eq!(ids(&visible), vec![4, 3, 2, 1]);
}

#[test]
fn derive_output_is_a_subset_of_input() {
    let problems = sample();
    let state = FilterState {
        search_query: "e".into(),
        sort: SortKey::TitleAsc,
        ..FilterState::default()
    };
    let visible = derive(&problems, &state);
    assert!(visible.len() <= problems.len());
    for shown in &visible {
        assert!(problems.iter().any(|problem| problem == *shown));
    }
}

#[test]
fn search_matches_title_description_platform_and_notes() {
    let problems = sample();
    let search = |query: &str| {
        let state = FilterState {
            search_query: query.into(),
            sort: SortKey::Oldest,
            ..FilterState::default()
        };
        ids(&derive(&problems, &state))
    };

    assert_eq!(search("TWO SUM"), vec![1]);
    assert_eq!(search("target"), vec![1]);
    assert_eq!(search("cses"), vec![4]);
    assert_eq!(search("bfs"), vec![2]);
    assert_eq!(search("leetcode"), vec![1, 3]);
    assert!(search("dijkstra").is_empty());
}

#[test]
fn whitespace_query_matches_everything() {
    let problems = sample();
    let state = FilterState {
        search_query: "   ".into(),
        ..FilterState::default()
    };
    assert_eq!(derive(&problems, &state).len(), problems.len());
}

#[test]
fn search_trims_query_before_matching() {
    let problems = sample();
    let state = FilterState {
        search_query: "  lru ".into(),
        ..FilterState::default()
    };
    assert_eq!(ids(&derive(&problems, &state)), vec![3]);
}

#[test]
fn difficulty_filter_ignores_label_case() {
    let problems = sample();
    let state = FilterState {
        difficulty: DifficultyFilter::Only(Difficulty::Easy),
        sort: SortKey::Oldest,
        ..FilterState::default()
    };
    assert_eq!(ids(&derive(&problems, &state)), vec![1, 4]);
}

#[test]
fn difficulty_filter_does_not_trim_stored_labels() {
    let mut problems = sample();
    problems.push(problem(5, "Padded", " easy ", "LeetCode"));
    let state = FilterState {
        difficulty: DifficultyFilter::Only(Difficulty::Easy),
        sort: SortKey::Oldest,
        ..FilterState::default()
    };
    assert_eq!(ids(&derive(&problems, &state)), vec![1, 4]);
}

#[test]
fn platform_filter_is_exact() {
    let mut problems = sample();
    problems.push(problem(5, "Edit Distance", "Hard", "leetcode"));
    let state = FilterState {
        platform: PlatformFilter::Only("LeetCode".into()),
        sort: SortKey::Oldest,
        ..FilterState::default()
    };
    assert_eq!(ids(&derive(&problems, &state)), vec![1, 3]);
}

#[test]
fn predicates_combine_with_and() {
    let problems = sample();
    let state = FilterState {
        search_query: "c".into(),
        difficulty: DifficultyFilter::Only(Difficulty::Medium),
        platform: PlatformFilter::Only("LeetCode".into()),
        sort: SortKey::Newest,
    };
    assert_eq!(ids(&derive(&problems, &state)), vec![3]);
}

#[test]
fn title_sorts_ignore_case_and_mirror_each_other() {
    let problems = sample();
    let asc = FilterState {
        sort: SortKey::TitleAsc,
        ..FilterState::default()
    };
    let desc = FilterState {
        sort: SortKey::TitleDesc,
        ..FilterState::default()
    };
    assert_eq!(ids(&derive(&problems, &asc)), vec![4, 2, 3, 1]);
    assert_eq!(ids(&derive(&problems, &desc)), vec![1, 3, 2, 4]);
}

#[test]
fn title_sort_places_accented_letters_with_their_base_letter() {
    let problems = vec![
        problem(1, "Zigzag Conversion", "Medium", "LeetCode"),
        problem(2, "Édition Distance", "Hard", "LeetCode"),
        problem(3, "apple", "Easy", "CSES"),
    ];
    let asc = FilterState {
        sort: SortKey::TitleAsc,
        ..FilterState::default()
    };
    let desc = FilterState {
        sort: SortKey::TitleDesc,
        ..FilterState::default()
    };
    assert_eq!(ids(&derive(&problems, &asc)), vec![3, 2, 1]);
    assert_eq!(ids(&derive(&problems, &desc)), vec![1, 2, 3]);
}

#[test]
fn search_folds_non_ascii_case() {
    let problems = vec![
        problem(1, "Édition Distance", "Hard", "LeetCode"),
        problem(2, "Two Sum", "Easy", "LeetCode"),
    ];
    let state = FilterState {
        search_query: "ÉDITION".into(),
        ..FilterState::default()
    };
    assert_eq!(ids(&derive(&problems, &state)), vec![1]);
}

#[test]
fn difficulty_sort_is_ascending_and_stable() {
    let mut problems = sample();
    problems.push(problem(5, "Mystery", "Extreme", "LeetCode"));
    let state = FilterState {
        sort: SortKey::Difficulty,
        ..FilterState::default()
    };
    // Unknown label ranks before Easy; the two Easy problems keep collection order.
    assert_eq!(ids(&derive(&problems, &state)), vec![5, 1, 4, 3, 2]);
}

#[test]
fn review_count_sort_is_descending_with_missing_as_zero() {
    let problems = sample();
    let state = FilterState {
        sort: SortKey::ReviewCount,
        ..FilterState::default()
    };
    assert_eq!(ids(&derive(&problems, &state)), vec![2, 1, 3, 4]);
}

#[test]
fn next_review_sort_puts_undated_last() {
    let problems = sample();
    let state = FilterState {
        sort: SortKey::NextReview,
        ..FilterState::default()
    };
    // 2 has no date, 4 has an unparseable one; both keep their input order at the end.
    assert_eq!(ids(&derive(&problems, &state)), vec![3, 1, 2, 4]);
}

#[test]
fn empty_collection_yields_empty_view() {
    let state = FilterState {
        search_query: "anything".into(),
        sort: SortKey::NextReview,
        ..FilterState::default()
    };
    assert!(derive(&[], &state).is_empty());
}

#[test]
fn derive_is_deterministic() {
    let problems = sample();
    let state = FilterState {
        search_query: "e".into(),
        sort: SortKey::ReviewCount,
        ..FilterState::default()
    };
    assert_eq!(ids(&derive(&problems, &state)), ids(&derive(&problems, &state)));
}

#[test]
fn platform_facet_keeps_first_seen_order_and_skips_empty() {
    let mut problems = sample();
    problems.push(problem(5, "Blank", "Easy", ""));
    problems.push(problem(6, "Repeat", "Easy", "Codeforces"));
    problems.push(problem(7, "Spaces", "Easy", "  "));

    assert_eq!(
        platform_facet(&problems),
        vec![
            PlatformFilter::All,
            PlatformFilter::Only("LeetCode".into()),
            PlatformFilter::Only("Codeforces".into()),
            PlatformFilter::Only("CSES".into()),
            PlatformFilter::Only("  ".into()),
        ]
    );
    assert_eq!(platform_facet(&[]), vec![PlatformFilter::All]);
}

#[test]
fn active_filters_track_any_non_default_field() {
    assert!(!has_active_filters(&FilterState::default()));

    let mut state = FilterState {
        sort: SortKey::Oldest,
        ..FilterState::default()
    };
    assert!(has_active_filters(&state));

    state.clear();
    assert!(!state.has_active_filters());

    state.search_query = " ".into();
    assert!(state.has_active_filters());
    assert_eq!(clear_filters(), FilterState::default());
}

#[test]
fn sort_key_parses_its_wire_names() {
    for key in SortKey::ALL {
        assert_eq!(key.as_str().parse::<SortKey>(), Ok(key));
    }
    assert_eq!("Title-Asc".parse::<SortKey>(), Ok(SortKey::TitleAsc));
    assert!("alphabetical".parse::<SortKey>().is_err());
}

#[test]
fn filter_values_parse_all_keyword() {
    assert_eq!("all".parse::<DifficultyFilter>(), Ok(DifficultyFilter::All));
    assert_eq!(
        "hard".parse::<DifficultyFilter>(),
        Ok(DifficultyFilter::Only(Difficulty::Hard))
    );
    assert_eq!("All".parse::<PlatformFilter>(), Ok(PlatformFilter::All));
    assert_eq!(
        "CSES".parse::<PlatformFilter>(),
        Ok(PlatformFilter::Only("CSES".into()))
    );
}

#[test]
fn derive_is_idempotent() {
    let problems = sample();
    for sort in SortKey::ALL {
        let state = FilterState {
            search_query: "e".into(),
            sort,
            ..FilterState::default()
        };
        let once: Vec<Problem> = derive(&problems, &state).into_iter().cloned().collect();
        let twice = derive(&once, &state);
        assert_eq!(ids(&twice), once.iter().map(|p| p.id.0).collect::<Vec<_>>());
    }
}

#[test]
fn two_problem_walkthrough() {
    let mut two_sum = problem(1, "Two Sum", "Easy", "LeetCode");
    two_sum.review_count = Some(2);
    let mut merge = problem(2, "Merge Intervals", "Medium", "LeetCode");
    merge.review_count = Some(0);
    let problems = vec![two_sum, merge];

    let easy = FilterState {
        difficulty: DifficultyFilter::Only(Difficulty::Easy),
        ..FilterState::default()
    };
    assert_eq!(ids(&derive(&problems, &easy)), vec![1]);

    let by_reviews = FilterState {
        sort: SortKey::ReviewCount,
        ..FilterState::default()
    };
    assert_eq!(ids(&derive(&problems, &by_reviews)), vec![1, 2]);

    let merge_search = FilterState {
        search_query: "MeRgE".into(),
        ..FilterState::default()
    };
    assert_eq!(ids(&derive(&problems, &merge_search)), vec![2]);
}
