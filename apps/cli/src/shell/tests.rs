use std::io::Cursor;

use usermgmt_infrastructure::connect;

use super::*;
use crate::cli_services::build_shell_services;

async fn demo_services() -> ShellServices {
    let pool = connect("sqlite::memory:", 1)
        .await
        .unwrap_or_else(|error| panic!("failed to open database: {error}"));
    initialize(&pool, InitMode::ResetWithDemo)
        .await
        .unwrap_or_else(|error| panic!("failed to initialize database: {error}"));

    build_shell_services(pool)
}

async fn run_script(services: &ShellServices, script: &str) -> String {
    let mut output = Vec::new();
    {
        let mut shell = Shell::new(Cursor::new(script.as_bytes()), &mut output, services.clone());
        shell
            .run()
            .await
            .unwrap_or_else(|error| panic!("shell failed: {error}"));
    }

    String::from_utf8(output).unwrap_or_else(|error| panic!("output is not utf-8: {error}"))
}

async fn usernames(services: &ShellServices) -> Vec<String> {
    services
        .users
        .list_users()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|user| user.username)
        .collect()
}

async fn role_permission_names(services: &ShellServices, role_id: i64) -> Vec<String> {
    services
        .roles
        .get_role_with_permissions(RoleId::new(role_id))
        .await
        .map(|role| role.permissions.into_iter().map(|p| p.name).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn end_of_input_quits_cleanly() {
    let services = demo_services().await;

    let output = run_script(&services, "").await;

    assert!(output.contains("=== User Management ==="));
    assert!(output.ends_with("Goodbye.\n"));
}

#[tokio::test]
async fn list_users_shows_demo_accounts() {
    let services = demo_services().await;

    let output = run_script(&services, "1\n7\n").await;

    assert!(output.contains("Username: admin"));
    assert!(output.contains("Email: user@test.com"));
    assert!(output.contains("Role: USER"));
}

#[tokio::test]
async fn unknown_menu_choice_is_reported() {
    let services = demo_services().await;

    let output = run_script(&services, "42\n7\n").await;

    assert!(output.contains("Invalid choice, please try again."));
}

#[tokio::test]
async fn overview_lists_every_table() {
    let services = demo_services().await;

    let output = run_script(&services, "2\n7\n").await;

    assert!(output.contains("ID: 1, Name: ADMIN"));
    assert!(output.contains("ID: 2, Username: user, Email: user@test.com, Role: USER"));
    assert!(output.contains("ID: 3, Name: DELETE, Description: Daten löschen"));
    assert!(output.contains("Role: USER, Permission: WRITE"));
    assert!(output.contains("Administrators: 1"));
}

#[tokio::test]
async fn create_user_persists_valid_input() {
    let services = demo_services().await;

    let output = run_script(&services, "3\nalice\nalice@test.com\n2\n7\n").await;

    assert!(output.contains("User created:"));
    assert_eq!(usernames(&services).await, vec!["admin", "user", "alice"]);
}

#[tokio::test]
async fn create_user_errors_are_printed_and_menu_continues() {
    let services = demo_services().await;

    let script = "3\nbob\nnot-an-email\n2\n3\nbob\nbob@test.com\n\n3\nadmin\nother@test.com\n2\n1\n7\n";
    let output = run_script(&services, script).await;

    assert!(output.contains("Error: invalid input: invalid email format 'not-an-email'"));
    assert!(output.contains("Error: invalid input: role must not be empty"));
    assert!(output.contains("Error: duplicate key"));
    assert!(output.contains("=== Users ==="));
    assert_eq!(usernames(&services).await, vec!["admin", "user"]);
}

#[tokio::test]
async fn deleting_last_admin_is_refused() {
    let services = demo_services().await;

    let output = run_script(&services, "4\n2\n1\nj\n4\n7\n").await;

    assert!(output.contains("Error: invariant violation"));
    assert_eq!(usernames(&services).await, vec!["admin", "user"]);
}

#[tokio::test]
async fn delete_requires_confirmation() {
    let services = demo_services().await;

    let cancelled = run_script(&services, "4\n2\n2\nn\n4\n7\n").await;
    assert!(cancelled.contains("Deletion cancelled."));
    assert_eq!(usernames(&services).await, vec!["admin", "user"]);

    let confirmed = run_script(&services, "4\n2\n2\nj\n4\n7\n").await;
    assert!(confirmed.contains("User deleted."));
    assert_eq!(usernames(&services).await, vec!["admin"]);
}

#[tokio::test]
async fn edit_user_keeps_blank_fields() {
    let services = demo_services().await;

    let output = run_script(&services, "4\n1\n2\n\nrenamed@test.com\n4\n7\n").await;

    assert!(output.contains("User updated:"));
    let user = services
        .users
        .find_user_by_username("user")
        .await
        .ok()
        .flatten()
        .unwrap_or_else(|| panic!("user should still exist"));
    assert_eq!(user.email, "renamed@test.com");
}

#[tokio::test]
async fn change_role_respects_last_admin() {
    let services = demo_services().await;

    let refused = run_script(&services, "4\n3\n1\n2\n4\n7\n").await;
    assert!(refused.contains("Error: invariant violation"));

    let promoted = run_script(&services, "4\n3\n2\n1\n4\n7\n").await;
    assert!(promoted.contains("Role of 'user' is now ADMIN."));
    assert_eq!(services.users.admin_count().await.ok(), Some(2));

    let demoted = run_script(&services, "4\n3\n1\n2\n4\n7\n").await;
    assert!(demoted.contains("Role of 'admin' is now USER."));
}

#[tokio::test]
async fn change_role_to_unknown_role_leaves_user_unchanged() {
    let services = demo_services().await;

    let output = run_script(&services, "4\n3\n2\n9\n4\n7\n").await;

    assert!(output.contains("Role not found."));
    let user = services
        .users
        .find_user_by_username("user")
        .await
        .ok()
        .flatten()
        .unwrap_or_else(|| panic!("user should still exist"));
    assert_eq!(user.role_name, "USER");
}

#[tokio::test]
async fn permission_grants_are_managed_per_role() {
    let services = demo_services().await;

    let added = run_script(&services, "5\n3\n2\n3\n3\n2\n3\n7\n7\n").await;
    assert!(added.contains("Permission added."));
    assert_eq!(
        role_permission_names(&services, 2).await,
        vec!["READ", "WRITE", "DELETE"]
    );

    let removed = run_script(&services, "5\n4\n1\n4\n7\n7\n").await;
    assert!(removed.contains("Permission removed."));
    assert_eq!(
        role_permission_names(&services, 1).await,
        vec!["READ", "WRITE", "DELETE"]
    );
}

#[tokio::test]
async fn role_permission_lookup_reports_bad_input() {
    let services = demo_services().await;

    let output = run_script(&services, "5\n2\n9\n2\nabc\n2\n2\n7\n7\n").await;

    assert!(output.contains("Error: not found: role 9 was not found"));
    assert!(output.contains("Error: invalid input: 'abc' is not a valid identifier"));
    assert!(output.contains("- READ: Daten lesen"));
}

#[tokio::test]
async fn roles_and_permissions_can_be_created() {
    let services = demo_services().await;

    let output = run_script(&services, "5\n6\nAUDITOR\n5\nAUDIT\n\n6\nADMIN\n7\n7\n").await;

    assert!(output.contains("Role 'AUDITOR' created with ID 3."));
    assert!(output.contains("Permission 'AUDIT' created with ID 5."));
    assert!(output.contains("Error: duplicate key"));
    let audit = services
        .permissions
        .list_permissions()
        .await
        .unwrap_or_default()
        .into_iter()
        .find(|permission| permission.name == "AUDIT");
    assert_eq!(audit.and_then(|permission| permission.description), None);
}

#[tokio::test]
async fn reset_restores_demo_data_after_confirmation() {
    let services = demo_services().await;
    run_script(&services, "3\nalice\nalice@test.com\n2\n7\n").await;

    let cancelled = run_script(&services, "6\nn\n7\n").await;
    assert!(cancelled.contains("Cancelled."));
    assert_eq!(usernames(&services).await.len(), 3);

    let confirmed = run_script(&services, "6\nJ\n7\n").await;
    assert!(confirmed.contains("Database reset and initialized."));
    assert_eq!(usernames(&services).await, vec!["admin", "user"]);
}

#[test]
fn confirmation_accepts_german_and_english() {
    for answer in ["j", "J", "ja", "y", "Yes", " y "] {
        assert!(confirmed(answer), "{answer} should confirm");
    }
    for answer in ["", "n", "nein", "no", "x"] {
        assert!(!confirmed(answer), "{answer} should not confirm");
    }
}
