use reshuffler::config::InputParams;
use reshuffler::core_types::Token;
use reshuffler::error::ReshufflerError;
use reshuffler::loader::{load_allocations, load_allocations_from_path, load_submissions, RejectedTransfer};
use reshuffler::scorer::AllocationKind;
use std::io::{Cursor, Write};

fn params(num_categories: usize, pool_owner: Option<&str>) -> InputParams {
    InputParams {
        num_categories,
        pool_owner: pool_owner.map(str::to_string),
        ..Default::default()
    }
}

// --- VALIDATED TABLE ---

#[test]
fn test_groups_and_orders_owners() {
    let csv = "Owner,TokenId,CategoryId\n\
               0xbb,10,2\n\
               0xaa,11,0\n\
               0xbb,12,1\n\
               0xaa,13,0\n";
    let allocations = load_allocations(Cursor::new(csv), &params(3, None)).unwrap();

    assert_eq!(allocations.len(), 2);
    assert_eq!(allocations[0].owner(), "0xaa");
    assert_eq!(allocations[0].tokens(), &[Token::new(11, 0), Token::new(13, 0)]);
    assert_eq!(allocations[1].owner(), "0xbb");
    assert_eq!(allocations[1].tokens(), &[Token::new(10, 2), Token::new(12, 1)]);
    assert_eq!(allocations[1].histogram().as_slice(), &[0, 1, 1]);
}

#[test]
fn test_trims_whitespace() {
    let csv = "Owner, TokenId, CategoryId\n 0xaa , 1 , 0\n0xbb,2,1\n";
    let allocations = load_allocations(Cursor::new(csv), &params(2, None)).unwrap();
    assert_eq!(allocations[0].owner(), "0xaa");
    assert_eq!(allocations[0].tokens(), &[Token::new(1, 0)]);
}

#[test]
fn test_marks_pool_owner() {
    let csv = "Owner,TokenId,CategoryId\n0xaa,1,0\n0xPOOL,2,1\n0xbb,3,1\n";
    let allocations = load_allocations(Cursor::new(csv), &params(2, Some("0xpool"))).unwrap();

    let kinds: Vec<AllocationKind> = allocations.iter().map(|a| a.kind()).collect();
    // Uppercase sorts first.
    assert_eq!(
        kinds,
        vec![AllocationKind::Pool, AllocationKind::Participant, AllocationKind::Participant]
    );
    assert_eq!(allocations[0].kind().to_string(), "pool");
    assert_eq!("participant".parse::<AllocationKind>().unwrap(), AllocationKind::Participant);
}

#[test]
fn test_rejects_duplicate_tokens() {
    let csv = "Owner,TokenId,CategoryId\n0xaa,1,0\n0xbb,1,1\n0xbb,2,0\n";
    let err = load_allocations(Cursor::new(csv), &params(2, None)).unwrap_err();
    assert!(matches!(err, ReshufflerError::DuplicateTokens(ids) if ids == vec![1]));
}

#[test]
fn test_rejects_category_out_of_range() {
    let csv = "Owner,TokenId,CategoryId\n0xaa,1,0\n0xbb,2,5\n";
    let err = load_allocations(Cursor::new(csv), &params(3, None)).unwrap_err();
    assert!(matches!(
        err,
        ReshufflerError::CategoryOutOfRange { token: 2, category: 5, num_categories: 3 }
    ));
}

#[test]
fn test_rejects_malformed_rows() {
    let csv = "Owner,TokenId,CategoryId\n0xaa,one,0\n";
    let err = load_allocations(Cursor::new(csv), &params(3, None)).unwrap_err();
    assert!(matches!(err, ReshufflerError::Csv(_)));
}

#[test]
fn test_loads_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "Owner,TokenId,CategoryId").unwrap();
    writeln!(file, "0xaa,1,0").unwrap();
    writeln!(file, "0xbb,2,1").unwrap();

    let allocations = load_allocations_from_path(file.path(), &params(2, None)).unwrap();
    assert_eq!(allocations.len(), 2);

    let missing = load_allocations_from_path(file.path().with_extension("missing"), &params(2, None));
    assert!(matches!(missing, Err(ReshufflerError::Io(_))));
}

// --- RAW SUBMISSIONS ---

const AIRDROPS: &str = "TokenId,Airdrop receiver,ProjectId\n\
                        1,0xAAaa,0\n\
                        2,0xaaaa,1\n\
                        3,0xbbbb,2\n\
                        4,0xbbbb,0\n\
                        5,0xcccc,1\n";

#[test]
fn test_accepts_transfers_from_receivers() {
    let transfers = "From,TokenId\n0xaaaa,1\n0xAAAA,2\n0xbbbb,3\n0xBBbb,4\n";
    let loaded = load_submissions(Cursor::new(AIRDROPS), Cursor::new(transfers), &params(3, None)).unwrap();

    assert!(loaded.rejected.is_empty());
    assert_eq!(loaded.allocations.len(), 2);
    assert_eq!(loaded.allocations[0].owner(), "0xaaaa");
    assert_eq!(loaded.allocations[0].tokens(), &[Token::new(1, 0), Token::new(2, 1)]);
    assert_eq!(loaded.allocations[1].owner(), "0xbbbb");
    assert_eq!(loaded.allocations[1].tokens(), &[Token::new(3, 2), Token::new(4, 0)]);
}

#[test]
fn test_rejects_foreign_and_unknown_tokens() {
    // 0xcccc sends a token it never received; token 9 was never airdropped.
    let transfers = "From,TokenId\n0xaaaa,1\n0xcccc,3\n0xbbbb,4\n0xcccc,9\n0xcccc,5\n";
    let loaded = load_submissions(Cursor::new(AIRDROPS), Cursor::new(transfers), &params(3, None)).unwrap();

    assert_eq!(
        loaded.rejected,
        vec![
            RejectedTransfer {
                token_id: 3,
                from: "0xcccc".to_string(),
                receiver: Some("0xbbbb".to_string()),
            },
            RejectedTransfer {
                token_id: 9,
                from: "0xcccc".to_string(),
                receiver: None,
            },
        ]
    );
    let owners: Vec<&str> = loaded.allocations.iter().map(|a| a.owner()).collect();
    assert_eq!(owners, vec!["0xaaaa", "0xbbbb", "0xcccc"]);
}

#[test]
fn test_repeated_submission_is_a_duplicate() {
    let transfers = "From,TokenId\n0xaaaa,1\n0xaaaa,1\n0xbbbb,3\n";
    let err = load_submissions(Cursor::new(AIRDROPS), Cursor::new(transfers), &params(3, None))
        .err()
        .unwrap();
    assert!(matches!(err, ReshufflerError::DuplicateTokens(ids) if ids == vec![1]));
}
