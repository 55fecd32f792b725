// std
use std::{env, ptr};
// self
use cookr_backend::{
	config::SupabaseEnv,
	supabase::{self, SupabaseClient},
};

// Every test binary is its own process, so this file owns the process-wide handle and the
// process environment.
#[test]
fn shared_handle_builds_from_vite_variables_once() {
	assert!(supabase::installed().is_none());

	let empty: [(&str, &str); 0] = [];
	let err = supabase::shared_from(SupabaseEnv::VITE, &empty)
		.expect_err("Absent configuration should surface the factory error.");

	assert_eq!(err.to_string(), "supabaseUrl is required.");
	assert!(supabase::installed().is_none(), "Failed construction must not bind a handle.");

	// SAFETY: this binary runs a single test, so no other thread touches the environment.
	unsafe {
		env::set_var("VITE_SUPABASE_URL", "https://proj.supabase.co");
		env::set_var("VITE_SUPABASE_ANON_KEY", "anon");
	}

	let first = supabase::shared().expect("The VITE variables should bind the shared handle.");

	assert_eq!(first.base_url().as_str(), "https://proj.supabase.co/");
	assert_eq!(first.key().expose(), "anon");

	let other_source =
		[("VITE_SUPABASE_URL", "https://other.supabase.co"), ("VITE_SUPABASE_ANON_KEY", "other")];
	let second = supabase::shared_from(SupabaseEnv::VITE, &other_source)
		.expect("Later calls should return the bound handle.");
	let third = supabase::shared().expect("The default accessor should return the bound handle.");

	assert!(ptr::eq(first, second));
	assert!(ptr::eq(first, third));

	let candidate = supabase::create_client("https://late.supabase.co", "late")
		.expect("Candidate handle should build.");
	let rejected: SupabaseClient =
		supabase::install(candidate).expect_err("A second handle cannot be installed.");

	assert_eq!(rejected.base_url().as_str(), "https://late.supabase.co/");
	assert!(ptr::eq(supabase::installed().expect("A handle should be bound."), first));
}
