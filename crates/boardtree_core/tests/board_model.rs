use boardtree_core::{Board, BoardNode};
use uuid::Uuid;

fn sample_board(id: Uuid, parent_id: Option<Uuid>) -> Board {
    Board {
        id,
        name: "Inbox".to_string(),
        parent_id,
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_360_000,
    }
}

#[test]
fn board_serialization_uses_expected_wire_fields() {
    let board_id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let parent_id = Uuid::parse_str("66666666-7777-4888-8999-aaaaaaaaaaaa").unwrap();
    let board = sample_board(board_id, Some(parent_id));

    let json = serde_json::to_value(&board).unwrap();
    assert_eq!(json["id"], board_id.to_string());
    assert_eq!(json["name"], "Inbox");
    assert_eq!(json["parent_id"], parent_id.to_string());
    assert_eq!(json["created_at"], 1_700_000_000_000_i64);
    assert_eq!(json["updated_at"], 1_700_000_360_000_i64);

    let decoded: Board = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, board);
}

#[test]
fn root_board_serializes_null_parent() {
    let board = sample_board(Uuid::new_v4(), None);

    let json = serde_json::to_value(&board).unwrap();
    assert!(json["parent_id"].is_null());
}

#[test]
fn board_node_flattens_board_fields_next_to_children() {
    let parent_id = Uuid::new_v4();
    let child_id = Uuid::new_v4();
    let node = BoardNode {
        board: sample_board(parent_id, None),
        children: vec![BoardNode {
            board: sample_board(child_id, Some(parent_id)),
            children: Vec::new(),
        }],
    };

    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(json["id"], parent_id.to_string());
    assert_eq!(json["name"], "Inbox");
    assert!(json["parent_id"].is_null());
    assert_eq!(json["children"][0]["id"], child_id.to_string());
    assert_eq!(json["children"][0]["parent_id"], parent_id.to_string());
    assert!(json["children"][0]["children"].as_array().unwrap().is_empty());
}
