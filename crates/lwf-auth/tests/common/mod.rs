use lwf_auth::{MemoryBackend, User};

/// A backend holding an editor, a plain user and root.
pub fn backend() -> MemoryBackend {
    let mut backend = MemoryBackend::new();
    backend
        .insert(
            User::create("alice", "password123")
                .unwrap()
                .with_roles(["editor", "user"]),
        )
        .unwrap();
    backend
        .insert(User::create("bob", "hunter2hunter2").unwrap().with_roles(["user"]))
        .unwrap();
    backend.insert(User::root("root")).unwrap();
    backend
}
