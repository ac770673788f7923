use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::components::explorer_view::ExplorerView;
use crate::config::ViewerConfig;

/// Reads the viewer settings from the query string, e.g.
/// `/?host=https://agent.example&root=n:Agent:42&mode=focus`.
#[component]
pub fn Home() -> impl IntoView {
	let query = use_query_map();
	let config = query.with_untracked(|q| ViewerConfig::from_query(|key| q.get(key)));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
				<p class="subtitle">"Pass ?host=...&root=... to choose a graph."</p>
			}
		}>
			{config.map(|config| view! { <ExplorerView config /> })}
		</ErrorBoundary>
	}
}
