use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use frame::{Frame, write_file};
use log::{debug, info, warn};

use crate::error::Result;
use crate::figure::Figure;
use crate::render::{figure_to_html, render_png, render_svg};

/// Hover text applied by [`Chart::add_tooltips`].
pub const TOOLTIP_TEMPLATE: &str = "%{x}<br>%{y:.2f}<extra></extra>";

/// Modebar buttons added by [`Chart::add_zoom_pan`].
pub const ZOOM_PAN_BUTTONS: [&str; 5] = ["zoom", "pan", "zoomIn", "zoomOut", "resetScale"];

/// The data a chart was built from, its title and the figure drawn from it.
///
/// A chart without a figure is inert: every mutator and output method is a no-op.
#[derive(Debug, Clone)]
pub struct Chart {
    pub data: Frame,
    pub title: Option<String>,
    pub fig: Option<Figure>,
}

impl Chart {
    pub fn new(data: Frame, title: Option<&str>) -> Self {
        Chart {
            data,
            title: title.map(str::to_string),
            fig: None,
        }
    }

    pub fn with_figure(data: Frame, title: Option<&str>, fig: Figure) -> Self {
        Chart {
            data,
            title: title.map(str::to_string),
            fig: Some(fig),
        }
    }

    /// Show the range slider under every x axis.
    pub fn add_range_slider(&mut self) -> &mut Self {
        if let Some(fig) = &mut self.fig {
            for row in 1..=fig.rows() {
                fig.layout.rangeslider.insert(row, true);
            }
        }
        self
    }

    /// Box zoom on drag, plus pan and zoom buttons in the modebar.
    pub fn add_zoom_pan(&mut self) -> &mut Self {
        if let Some(fig) = &mut self.fig {
            fig.layout.dragmode = Some("zoom".to_string());
            fig.layout.modebar_add = ZOOM_PAN_BUTTONS.iter().map(|b| b.to_string()).collect();
        }
        self
    }

    /// Hover tooltips with the x value and y to two decimals, on every current trace.
    pub fn add_tooltips(&mut self) -> &mut Self {
        if let Some(fig) = &mut self.fig {
            fig.update_hovertemplate(TOOLTIP_TEMPLATE);
        }
        self
    }

    /// The chart as a standalone HTML page, if there is a figure.
    pub fn to_html(&self) -> Result<Option<String>> {
        self.fig
            .as_ref()
            .map(|fig| figure_to_html(fig, self.title.as_deref()))
            .transpose()
    }

    pub fn write_html<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let Some(html) = self.to_html()? else {
            debug!("chart has no figure, skipping HTML output");
            return Ok(());
        };
        write_file(path.as_ref(), html)?;
        info!("Wrote {}", path.as_ref().display());
        Ok(())
    }

    pub fn write_svg<P: AsRef<Path>>(&self, path: P, size: (u32, u32)) -> Result<()> {
        let Some(fig) = &self.fig else {
            return Ok(());
        };
        frame::write::ensure_parent_dir(path.as_ref())?;
        render_svg(fig, path.as_ref(), size)?;
        info!("Wrote {}", path.as_ref().display());
        Ok(())
    }

    pub fn write_png<P: AsRef<Path>>(&self, path: P, size: (u32, u32)) -> Result<()> {
        let Some(fig) = &self.fig else {
            return Ok(());
        };
        frame::write::ensure_parent_dir(path.as_ref())?;
        render_png(fig, path.as_ref(), size)?;
        info!("Wrote {}", path.as_ref().display());
        Ok(())
    }

    /// Write the chart to a temporary HTML file and open it in the browser.
    ///
    /// Returns the file written. Failing to launch a browser is logged, not returned.
    pub fn show(&self) -> Result<Option<PathBuf>> {
        if self.fig.is_none() {
            return Ok(None);
        }

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let name = format!("financeplotter-{}-{}.html", std::process::id(), stamp);
        let path = std::env::temp_dir().join(name);
        self.write_html(&path)?;

        if let Err(e) = open_in_browser(&path) {
            warn!("could not open {} in a browser: {}", path.display(), e);
        }
        Ok(Some(path))
    }
}

fn open_in_browser(path: &Path) -> std::io::Result<()> {
    let mut cmd = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };
    cmd.arg(path).spawn().map(|_| ())
}
