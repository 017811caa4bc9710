use crate::models::*;
use crate::{credentials, Config, Error, Store};
use tempfile::TempDir;

async fn open_store() -> (Store, TempDir) {
    let dir = tempfile::tempdir().expect("should create a temporary directory");
    let db_path = dir.path().join("arsip.db");
    let store = crate::create(&Config::for_url(db_path.to_string_lossy()))
        .await
        .expect("should open and migrate the database");
    (store, dir)
}

async fn add_user(store: &Store) -> User {
    store
        .create_user(UserDraft {
            username: "admin".to_owned(),
            password_hash: credentials::hash_password("a long enough password").unwrap(),
            full_name: Some("Administrator".to_owned()),
            is_admin: true,
        })
        .await
        .expect("should create the user")
}

async fn add_employee(store: &Store, name: &str) -> Employee {
    store
        .add_employee(EmployeeDraft {
            name: name.to_owned(),
            position: Some("Staff".to_owned()),
            employee_number: None,
        })
        .await
        .expect("should add the employee")
}

fn date(s: &str) -> jiff::civil::Date {
    s.parse().expect("should be a valid date")
}

mod users {
    use super::*;

    #[tokio::test]
    async fn it_loads_a_created_user_by_username_and_by_id() {
        let (store, _dir) = open_store().await;
        assert_eq!(store.count_users().await.unwrap(), 0);
        let created = add_user(&store).await;
        let by_name = store
            .load_user_by_username("admin")
            .await
            .unwrap()
            .expect("user should be found by username");
        assert_eq!(by_name.id, created.id);
        assert!(by_name.is_admin);
        let verified = credentials::verify(&by_name, "a long enough password").unwrap();
        assert!(verified);
        let by_id = store.load_user_by_id(created.id).await.unwrap();
        assert_eq!(by_id.map(|u| u.username), Some("admin".to_owned()));
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn it_returns_none_for_an_unknown_username() {
        let (store, _dir) = open_store().await;
        add_user(&store).await;
        assert!(store
            .load_user_by_username("nobody")
            .await
            .unwrap()
            .is_none());
        assert!(store.load_user_by_id(4242).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn it_rejects_a_duplicate_username() {
        let (store, _dir) = open_store().await;
        add_user(&store).await;
        let duplicate = store
            .create_user(UserDraft {
                username: "admin".to_owned(),
                password_hash: "x".to_owned(),
                full_name: None,
                is_admin: false,
            })
            .await;
        assert!(matches!(duplicate, Err(Error::Result(_))));
    }
}

mod employees {
    use super::*;

    #[tokio::test]
    async fn it_adds_employees_with_fresh_ids_and_lists_them_in_insertion_order() {
        let (store, _dir) = open_store().await;
        let first = store
            .add_employee(EmployeeDraft {
                name: "Budi".to_owned(),
                position: Some("Staff".to_owned()),
                employee_number: Some("19800101".to_owned()),
            })
            .await
            .unwrap();
        let second = add_employee(&store, "Sari").await;
        assert!(first.id > 0, "ids should be positive");
        assert!(second.id > first.id, "ids should increase");
        let listed = store.list_employees().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Budi");
        assert_eq!(listed[0].position.as_deref(), Some("Staff"));
        assert_eq!(listed[0].employee_number.as_deref(), Some("19800101"));
        assert_eq!(listed[1].id, second.id);
        assert_eq!(store.count_employees().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn it_searches_names_by_substring_ignoring_case() {
        let (store, _dir) = open_store().await;
        add_employee(&store, "Kutaraya").await;
        add_employee(&store, "Budi").await;
        let found = store.search_employees("kut").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Kutaraya");
        let found = store.search_employees("UD").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Budi");
    }

    #[tokio::test]
    async fn it_treats_wildcards_in_the_search_text_literally() {
        let (store, _dir) = open_store().await;
        add_employee(&store, "Budi").await;
        add_employee(&store, "Unit 50% Budi").await;
        let found = store.search_employees("%").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Unit 50% Budi");
        assert!(store.search_employees("_").await.unwrap().is_empty());
    }
}

mod incoming {
    use super::*;

    fn draft(mail_number: &str, subject: &str, received: Option<&str>) -> IncomingMailDraft {
        IncomingMailDraft {
            mail_number: mail_number.to_owned(),
            origin: Some("Dinas X".to_owned()),
            subject: Some(subject.to_owned()),
            date_received: received.map(date),
            attachment: None,
        }
    }

    #[tokio::test]
    async fn it_lists_the_most_recently_received_first() {
        let (store, _dir) = open_store().await;
        store
            .add_incoming_mail(draft("001/A", "Rapat", Some("2024-01-10")))
            .await
            .unwrap();
        store
            .add_incoming_mail(draft("002/A", "Undangan", Some("2024-03-01")))
            .await
            .unwrap();
        store
            .add_incoming_mail(draft("003/A", "Laporan", Some("2024-02-15")))
            .await
            .unwrap();
        let listed = store.list_incoming_mail().await.unwrap();
        let numbers = listed
            .iter()
            .map(|m| m.mail_number.as_str())
            .collect::<Vec<_>>();
        assert_eq!(numbers, ["002/A", "003/A", "001/A"]);
        assert_eq!(
            listed[0].date_received.as_ref().map(|d| d.to_jiff()),
            Some(date("2024-03-01"))
        );
    }

    #[tokio::test]
    async fn it_searches_number_or_subject() {
        let (store, _dir) = open_store().await;
        store
            .add_incoming_mail(draft("UND-7", "Rapat", None))
            .await
            .unwrap();
        store
            .add_incoming_mail(draft("001/B", "Undangan rapat", None))
            .await
            .unwrap();
        store
            .add_incoming_mail(draft("002/B", "Laporan", None))
            .await
            .unwrap();
        let found = store.search_incoming_mail("und").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(store.search_incoming_mail("zzz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn it_updates_only_the_changed_columns() {
        let (store, _dir) = open_store().await;
        let mail = store
            .add_incoming_mail(draft("001/C", "Rapat", Some("2024-01-10")))
            .await
            .unwrap();
        let updated = store
            .update_incoming_mail(
                mail.id,
                IncomingMailChanges {
                    attachment: Some(Some("scan.pdf".to_owned())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.attachment.as_deref(), Some("scan.pdf"));
        assert_eq!(updated.mail_number, "001/C");
        assert_eq!(updated.subject.as_deref(), Some("Rapat"));
        assert_eq!(store.count_incoming_mail().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn it_reports_not_found_when_updating_a_missing_record() {
        let (store, _dir) = open_store().await;
        let result = store
            .update_incoming_mail(
                77,
                IncomingMailChanges {
                    mail_number: Some("x".to_owned()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(Error::NotFound)));
    }
}

mod outgoing {
    use super::*;

    fn draft(created_by: i32, subject: &str, assigned_to: Vec<i32>) -> OutgoingMailDraft {
        OutgoingMailDraft {
            mail_number: Some("800/12".to_owned()),
            subject: subject.to_owned(),
            mail_date: Some(date("2024-05-02")),
            recipient: Some("Dinas X".to_owned()),
            body: "Dengan hormat".to_owned(),
            created_by,
            assigned_to,
        }
    }

    #[tokio::test]
    async fn it_resolves_assigned_names_in_order_and_skips_missing_employees() {
        let (store, _dir) = open_store().await;
        let user = add_user(&store).await;
        let mut employees = Vec::new();
        for name in ["Ani", "Budi", "Citra", "Dewi", "Eko"] {
            employees.push(add_employee(&store, name).await);
        }
        let (second, fifth) = (employees[1].id, employees[4].id);
        let mail = store
            .add_outgoing_mail(draft(user.id, "Undangan", vec![second, fifth, 999]))
            .await
            .unwrap();
        assert!(
            mail.pdf_filename.is_none(),
            "pdf is attached in a second step"
        );
        let names = store.assigned_employee_names(mail.id).await.unwrap();
        assert_eq!(names, ["Budi", "Eko"]);
    }

    #[tokio::test]
    async fn it_keeps_the_chosen_order_of_assignments() {
        let (store, _dir) = open_store().await;
        let user = add_user(&store).await;
        let ani = add_employee(&store, "Ani").await;
        let budi = add_employee(&store, "Budi").await;
        let mail = store
            .add_outgoing_mail(draft(user.id, "Tugas", vec![budi.id, ani.id]))
            .await
            .unwrap();
        assert_eq!(
            store.assigned_employee_names(mail.id).await.unwrap(),
            ["Budi", "Ani"]
        );
    }

    #[tokio::test]
    async fn it_attaches_the_pdf_filename_with_an_update() {
        let (store, _dir) = open_store().await;
        let user = add_user(&store).await;
        let mail = store
            .add_outgoing_mail(draft(user.id, "Undangan", Vec::new()))
            .await
            .unwrap();
        let filename = format!("surat_keluar_{}.pdf", mail.id);
        let updated = store
            .update_outgoing_mail(
                mail.id,
                OutgoingMailChanges {
                    pdf_filename: Some(Some(filename.clone())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.pdf_filename, Some(filename));
        assert_eq!(updated.subject, "Undangan");
        assert_eq!(updated.created_by, user.id);
        assert!(store
            .assigned_employee_names(mail.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn it_lists_newest_dated_first_and_searches_number_or_subject() {
        let (store, _dir) = open_store().await;
        let user = add_user(&store).await;
        let mut older = draft(user.id, "Laporan bulanan", Vec::new());
        older.mail_date = Some(date("2023-12-31"));
        older.mail_number = Some("900/1".to_owned());
        store.add_outgoing_mail(older).await.unwrap();
        store
            .add_outgoing_mail(draft(user.id, "Undangan rapat", Vec::new()))
            .await
            .unwrap();
        let listed = store.list_outgoing_mail().await.unwrap();
        assert_eq!(listed[0].subject, "Undangan rapat");
        assert_eq!(listed[1].subject, "Laporan bulanan");
        let found = store.search_outgoing_mail("900").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].subject, "Laporan bulanan");
        let found = store.search_outgoing_mail("RAPAT").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(store.count_outgoing_mail().await.unwrap(), 2);
    }
}
