//! Touch-panel builder
//!
//! Generates the endpoint's panel extension markup from the preset
//! registry, filtered by call state. Pure string generation plus one
//! read-then-write to preserve the panel's position among the device's
//! existing custom panels.

use crate::core::config::PanelConfig;
use crate::core::presets::Page;
use crate::xapi::{XapiClient, XapiError};

/// Widget id for a page's option group: `{panel_id}-{page_index}`.
pub fn widget_id(panel_id: &str, page: usize) -> String {
    format!("{panel_id}-{page}")
}

/// Recover the page index from a widget id, if the widget belongs to us.
pub fn parse_widget_id(panel_id: &str, widget_id: &str) -> Option<usize> {
    let suffix = widget_id.strip_prefix(panel_id)?.strip_prefix('-')?;
    suffix.parse().ok()
}

/// Build the full panel markup. Options hidden by the call-state filter
/// keep their unfiltered indices as value keys, so a pressed key resolves
/// to the same preset no matter which filter was in force at build time.
pub fn build_markup(
    panel: &PanelConfig,
    pages: &[Page],
    in_call: bool,
    order: Option<u32>,
) -> String {
    let order_tag = order.map(|o| format!("<Order>{o}</Order>")).unwrap_or_default();
    let page_markup: String = pages
        .iter()
        .enumerate()
        .map(|(index, page)| build_page(panel, page, index, in_call))
        .collect();

    format!(
        "<Extensions>\
         <Panel>\
         <Origin>local</Origin>\
         <Location>HomeScreenAndCallControls</Location>\
         <Icon>{icon}</Icon>\
         <Color>{color}</Color>\
         <Name>{name}</Name>\
         {order_tag}\
         <ActivityType>Custom</ActivityType>\
         {page_markup}\
         </Panel>\
         </Extensions>",
        icon = panel.icon,
        color = panel.color,
        name = escape(&panel.name),
    )
}

fn build_page(panel: &PanelConfig, page: &Page, index: usize, in_call: bool) -> String {
    let values: String = page
        .visible_options(in_call)
        .into_iter()
        .map(|(key, preset)| {
            format!(
                "<Value><Key>{key}</Key><Name>{}</Name></Value>",
                escape(&preset.name)
            )
        })
        .collect();

    let widget = format!(
        "<Widget>\
         <WidgetId>{id}</WidgetId>\
         <Type>GroupButton</Type>\
         <Options>size=4;columns=1</Options>\
         <ValueSpace>{values}</ValueSpace>\
         </Widget>",
        id = widget_id(&panel.panel_id, index),
    );

    format!(
        "<Page><Name>{name}</Name><Row>{widget}</Row>\
         <PageId>{id}</PageId>\
         <Options>hideRowNames=1</Options></Page>",
        name = escape(&page.name),
        id = widget_id(&panel.panel_id, index),
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Rebuild and save the panel, preserving its display order by reading the
/// device's current panel list first.
pub async fn sync_panel(
    client: &XapiClient,
    panel: &PanelConfig,
    pages: &[Page],
    in_call: bool,
) -> Result<(), XapiError> {
    let order = client
        .list_panels()
        .await?
        .into_iter()
        .find(|p| p.panel_id == panel.panel_id)
        .and_then(|p| p.order);

    let markup = build_markup(panel, pages, in_call, order);
    client.save_panel(&panel.panel_id, &markup).await
}
